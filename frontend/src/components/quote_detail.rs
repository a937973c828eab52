use erp_shared::protocol::{
    AddQuoteItemRequest, DeleteQuoteItemRequest, GetQuoteRequest, ListProductSummariesRequest,
    UpdateQuoteItemRequest, UpdateQuoteStatusRequest,
};
use erp_shared::table::{Column, TableSpec, rows_from_serialize};
use erp_shared::{ProductSummary, QuoteDetail, QuoteItem, QuoteStatus};
use leptos::prelude::*;

use crate::api::{Api, api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::{Field, optional_number};
use crate::components::quotes::money;
use crate::components::status::{Status, StatusLine, track};

fn items_table(items: &[QuoteItem]) -> TableSpec {
    TableSpec::new(
        vec![
            Column::new("id", "Item"),
            Column::new("sku_snapshot", "SKU"),
            Column::new("name_snapshot", "Produto"),
            Column::new("unit_snapshot", "Unidade"),
            Column::new("quantity", "Qtd."),
            Column::new("unit_price", "Preço").with_formatter(|v, _| money(v)),
            Column::new("discount_percent", "Desc. (%)"),
            Column::new("net_total", "Líquido").with_formatter(|v, _| money(v)),
        ],
        rows_from_serialize(items),
    )
    .with_filter_keys(["sku_snapshot", "name_snapshot"])
    .with_empty_text("Orçamento sem itens.")
}

/// 加载报价单抬头和明细，金额已重新计算
fn open(api: Api, id: i64, status: RwSignal<Status>, detail: RwSignal<Option<QuoteDetail>>) {
    track(status, async move {
        let loaded = api
            .call(&GetQuoteRequest { id })
            .await
            .map_err(|e| error_text("Falha ao abrir orçamento", &e))?;
        let count = loaded.items.len();
        detail.set(Some(loaded));
        Ok(format!("Orçamento {} com {} itens.", id, count))
    });
}

/// 单个报价单的抬头、明细及明细编辑
///
/// 每次写操作后调用 `on_change`，让报价列表刷新金额。
#[component]
pub fn QuoteDetailPanel(on_change: Callback<()>) -> impl IntoView {
    let auth = use_auth();

    let quote_id = RwSignal::new(String::new());
    let current = RwSignal::new(Option::<i64>::None);
    let detail = RwSignal::new(Option::<QuoteDetail>::None);
    let detail_status = RwSignal::new(Status::Idle);
    let edit_status = RwSignal::new(Status::Idle);
    let products = RwSignal::new(Vec::<ProductSummary>::new());

    let new_status = RwSignal::new(QuoteStatus::Draft);
    let product_id = RwSignal::new(String::new());
    let quantity = RwSignal::new("1".to_string());
    let unit_price = RwSignal::new(String::new());
    let discount = RwSignal::new(String::new());
    let item_id = RwSignal::new(String::new());

    {
        let api = api_client(&auth);
        track(edit_status, async move {
            let list = api
                .call(&ListProductSummariesRequest)
                .await
                .map_err(|e| error_text("Falha ao carregar produtos", &e))?;
            let count = list.len();
            products.set(list);
            Ok(format!("{} produtos disponíveis.", count))
        });
    }

    // 写操作后重新读取当前报价单
    let refresh = move || {
        if let Some(id) = current.get_untracked() {
            open(api_client(&auth), id, detail_status, detail);
        }
        on_change.run(());
    };

    let on_open = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Ok(Some(id)) = optional_number::<i64>(quote_id) else {
            detail_status.set(Status::Err("Informe o número do orçamento.".to_string()));
            return;
        };
        current.set(Some(id));
        open(api_client(&auth), id, detail_status, detail);
    };

    let on_status = move |_: leptos::web_sys::MouseEvent| {
        let Some(id) = current.get_untracked() else {
            return;
        };
        let req = UpdateQuoteStatusRequest {
            id,
            status: new_status.get_untracked(),
        };
        let api = api_client(&auth);
        track(edit_status, async move {
            let quote = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao alterar status", &e))?;
            refresh();
            Ok(format!("Status alterado para {}.", quote.status))
        });
    };

    let on_add = move |_: leptos::web_sys::MouseEvent| {
        let Some(quote_id) = current.get_untracked() else {
            return;
        };
        let (Ok(Some(product_id)), Ok(Some(quantity))) = (
            optional_number::<i64>(product_id),
            optional_number::<f64>(quantity),
        ) else {
            edit_status.set(Status::Err("Escolha o produto e a quantidade.".to_string()));
            return;
        };
        let (Ok(unit_price), Ok(discount_percent)) =
            (optional_number::<f64>(unit_price), optional_number::<f64>(discount))
        else {
            edit_status.set(Status::Err("Preço e desconto devem ser números.".to_string()));
            return;
        };
        let req = AddQuoteItemRequest {
            quote_id,
            product_id,
            quantity,
            unit_price,
            discount_percent,
        };
        let api = api_client(&auth);
        track(edit_status, async move {
            let item = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao adicionar item", &e))?;
            refresh();
            Ok(format!("Item {} adicionado.", item.name_snapshot))
        });
    };

    let on_update = move |_: leptos::web_sys::MouseEvent| {
        let Some(quote_id) = current.get_untracked() else {
            return;
        };
        let Ok(Some(item_id)) = optional_number::<i64>(item_id) else {
            edit_status.set(Status::Err("Informe o número do item.".to_string()));
            return;
        };
        let (Ok(quantity), Ok(unit_price), Ok(discount_percent)) = (
            optional_number::<f64>(quantity),
            optional_number::<f64>(unit_price),
            optional_number::<f64>(discount),
        ) else {
            edit_status.set(Status::Err(
                "Quantidade, preço e desconto devem ser números.".to_string(),
            ));
            return;
        };
        let req = UpdateQuoteItemRequest {
            quote_id,
            item_id,
            quantity,
            unit_price,
            discount_percent,
        };
        let api = api_client(&auth);
        track(edit_status, async move {
            let item = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao atualizar item", &e))?;
            refresh();
            Ok(format!("Item {} atualizado.", item.id))
        });
    };

    let on_delete = move |_: leptos::web_sys::MouseEvent| {
        let Some(quote_id) = current.get_untracked() else {
            return;
        };
        let Ok(Some(item_id)) = optional_number::<i64>(item_id) else {
            edit_status.set(Status::Err("Informe o número do item.".to_string()));
            return;
        };
        let api = api_client(&auth);
        track(edit_status, async move {
            api.call(&DeleteQuoteItemRequest { quote_id, item_id })
                .await
                .map_err(|e| error_text("Falha ao remover item", &e))?;
            refresh();
            Ok(format!("Item {} removido.", item_id))
        });
    };

    let busy = move || edit_status.get().is_busy() || current.get().is_none();

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_open>
            <Field label="Orçamento (ID)" value=quote_id kind="number" />
            <button class="btn btn-sm" disabled=move || detail_status.get().is_busy()>
                "Abrir"
            </button>
        </form>
        <StatusLine status=detail_status />
        {move || {
            detail
                .get()
                .map(|d| {
                    let quote = d.quote;
                    view! {
                        <div class="text-sm">
                            <p>{format!("{} · {}", quote.customer_name, quote.status)}</p>
                            <p>
                                {format!(
                                    "Bruto {} · Desconto {} · Líquido {}",
                                    money(&quote.total_gross.into()),
                                    money(&quote.total_discount.into()),
                                    money(&quote.total_net.into()),
                                )}
                            </p>
                        </div>
                        <DataTable spec=items_table(&d.items) />
                    }
                })
        }}
        <div class="flex flex-wrap gap-3 items-end">
            <label class="form-control w-full max-w-xs">
                <span class="label-text">"Status"</span>
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| {
                        if let Some(s) = QuoteStatus::parse(&event_target_value(&ev)) {
                            new_status.set(s);
                        }
                    }
                >
                    {QuoteStatus::ALL
                        .into_iter()
                        .map(|s| {
                            view! {
                                <option value=s.as_str() selected=move || new_status.get() == s>
                                    {s.as_str()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>
            <button class="btn btn-sm" disabled=busy on:click=on_status>
                "Alterar status"
            </button>
        </div>
        <div class="flex flex-wrap gap-3 items-end">
            <label class="form-control w-full max-w-xs">
                <span class="label-text">"Produto"</span>
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| product_id.set(event_target_value(&ev))
                >
                    <option value="">"Escolha..."</option>
                    {move || {
                        products
                            .get()
                            .into_iter()
                            .map(|p| {
                                view! {
                                    <option value={p.id.to_string()}>
                                        {format!("{} · {} ({})", p.sku, p.name, money(&p.price.into()))}
                                    </option>
                                }
                            })
                            .collect_view()
                    }}
                </select>
            </label>
            <Field label="Quantidade" value=quantity />
            <Field label="Preço unitário" value=unit_price placeholder="do produto" />
            <Field label="Desconto (%)" value=discount placeholder="da categoria" />
            <button class="btn btn-primary btn-sm" disabled=busy on:click=on_add>
                "Adicionar item"
            </button>
        </div>
        <div class="flex flex-wrap gap-3 items-end">
            <Field label="Item" value=item_id kind="number" />
            <button class="btn btn-sm" disabled=busy on:click=on_update>
                "Atualizar item"
            </button>
            <button class="btn btn-sm btn-error" disabled=busy on:click=on_delete>
                "Remover item"
            </button>
        </div>
        <StatusLine status=edit_status />
    }
}
