use erp_shared::protocol::{CreateMovementRequest, ListMovementsRequest, StockBalanceRequest};
use erp_shared::table::{Column, TableSpec, rows_from_serialize};
use erp_shared::{MovementType, StockBalance, StockMovement};
use leptos::prelude::*;

use crate::api::{Api, api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::{Field, optional_text};
use crate::components::status::{Status, StatusLine, track};

fn movements_table(movements: &[StockMovement]) -> TableSpec {
    TableSpec::new(
        vec![
            Column::new("id", "ID"),
            Column::new("product_id", "Produto"),
            Column::new("type", "Tipo"),
            Column::new("quantity", "Quantidade"),
            Column::new("note", "Observação"),
            Column::new("created_at", "Data"),
        ],
        rows_from_serialize(movements),
    )
    .with_filter_keys(["product_id", "type", "note"])
    .with_empty_text("Nenhuma movimentação registrada.")
}

fn balances_table(balances: &[StockBalance]) -> TableSpec {
    TableSpec::new(
        vec![
            Column::new("product_id", "Produto"),
            Column::new("sku", "SKU"),
            Column::new("name", "Nome"),
            Column::new("balance", "Saldo"),
        ],
        rows_from_serialize(balances),
    )
    .with_filter_keys(["sku", "name"])
    .with_empty_text("Nenhum saldo disponível.")
}

/// 重新加载两张表，共用一条状态
fn load(
    api: Api,
    status: RwSignal<Status>,
    movements: RwSignal<Option<TableSpec>>,
    balances: RwSignal<Option<TableSpec>>,
) {
    track(status, async move {
        let list = api
            .call(&ListMovementsRequest)
            .await
            .map_err(|e| error_text("Falha ao carregar movimentações", &e))?;
        movements.set(Some(movements_table(&list)));
        let totals = api
            .call(&StockBalanceRequest)
            .await
            .map_err(|e| error_text("Falha ao carregar saldos", &e))?;
        balances.set(Some(balances_table(&totals)));
        Ok(format!("{} movimentações, {} produtos com saldo.", list.len(), totals.len()))
    });
}

#[component]
pub fn StockPage() -> impl IntoView {
    let auth = use_auth();

    let product_id = RwSignal::new(String::new());
    let movement_type = RwSignal::new(MovementType::In);
    let quantity = RwSignal::new(String::new());
    let note = RwSignal::new(String::new());
    let form_status = RwSignal::new(Status::Idle);
    let list_status = RwSignal::new(Status::Idle);
    let movements = RwSignal::new(Option::<TableSpec>::None);
    let balances = RwSignal::new(Option::<TableSpec>::None);

    load(api_client(&auth), list_status, movements, balances);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Ok(product_id) = product_id.get_untracked().trim().parse::<i64>() else {
            form_status.set(Status::Err("Produto deve ser um ID numérico.".to_string()));
            return;
        };
        let Ok(quantity) = quantity.get_untracked().trim().replace(',', ".").parse::<f64>() else {
            form_status.set(Status::Err("Quantidade deve ser um número.".to_string()));
            return;
        };
        let req = CreateMovementRequest {
            product_id,
            movement_type: movement_type.get_untracked(),
            quantity,
            note: optional_text(note),
        };
        let api = api_client(&auth);
        track(form_status, async move {
            let movement = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao registrar movimentação", &e))?;
            load(api, list_status, movements, balances);
            Ok(format!("Movimentação {} registrada.", movement.id))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="Produto (ID)" value=product_id kind="number" />
            <label class="form-control w-full max-w-xs">
                <span class="label-text">"Tipo"</span>
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| {
                        if let Some(t) = MovementType::parse(&event_target_value(&ev)) {
                            movement_type.set(t);
                        }
                    }
                >
                    {MovementType::ALL
                        .into_iter()
                        .map(|t| {
                            view! {
                                <option value=t.as_str() selected=move || movement_type.get() == t>
                                    {t.as_str()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>
            <Field label="Quantidade" value=quantity kind="number" />
            <Field label="Observação" value=note />
            <button class="btn btn-primary btn-sm" disabled=move || form_status.get().is_busy()>
                "Registrar"
            </button>
        </form>
        <StatusLine status=form_status />
        <div class="divider"></div>
        <button
            class="btn btn-sm"
            on:click=move |_| load(api_client(&auth), list_status, movements, balances)
        >
            "Atualizar"
        </button>
        <StatusLine status=list_status />
        <h2 class="text-lg font-semibold">"Saldos"</h2>
        {move || balances.get().map(|spec| view! { <DataTable spec=spec /> })}
        <h2 class="text-lg font-semibold">"Movimentações"</h2>
        {move || movements.get().map(|spec| view! { <DataTable spec=spec /> })}
    }
}
