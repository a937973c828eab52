//! 通用表格组件（可排序、可过滤）
//!
//! 每次挂载持有新的 [`TableView`]：替换 `TableSpec` 会重新挂载组件，
//! 过滤框和排序随之重置。

use erp_shared::table::{TableSpec, TableView};
use leptos::prelude::*;

#[component]
pub fn DataTable(spec: TableSpec) -> impl IntoView {
    let view_state = RwSignal::new(TableView::default());
    let column_count = spec.columns.len().max(1);
    let headers: Vec<(String, String)> = spec
        .columns
        .iter()
        .map(|c| (c.key.clone(), c.title.clone()))
        .collect();
    let spec = StoredValue::new(spec);

    let body = move || {
        let cells = view_state.with(|view| spec.with_value(|s| s.cells(view)));
        if cells.is_empty() {
            let text = spec.with_value(|s| s.empty_text.clone());
            return view! {
                <tr>
                    <td colspan=column_count.to_string() class="text-center text-base-content/60">
                        {text}
                    </td>
                </tr>
            }
            .into_any();
        }
        cells
            .into_iter()
            .map(|row| {
                view! {
                    <tr>{row.into_iter().map(|cell| view! { <td>{cell}</td> }).collect_view()}</tr>
                }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <div class="space-y-2">
            <input
                type="search"
                class="input input-bordered input-sm w-full max-w-xs"
                placeholder="Filtrar..."
                prop:value=move || view_state.with(|v| v.query.clone())
                on:input=move |ev| {
                    let query = event_target_value(&ev);
                    view_state.update(|v| v.query = query);
                }
            />
            <div class="overflow-x-auto">
                <table class="table table-zebra table-sm">
                    <thead>
                        <tr>
                            {headers
                                .into_iter()
                                .map(|(key, title)| {
                                    let sort_key = key.clone();
                                    view! {
                                        <th
                                            class="cursor-pointer select-none"
                                            on:click=move |_| view_state.update(|v| v.toggle_sort(&sort_key))
                                        >
                                            {title}
                                            " "
                                            {move || view_state.with(|v| v.sort_indicator(&key))}
                                        </th>
                                    }
                                })
                                .collect_view()}
                        </tr>
                    </thead>
                    <tbody>{body}</tbody>
                </table>
            </div>
        </div>
    }
}
