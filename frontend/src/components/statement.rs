use chrono::NaiveDate;
use erp_shared::protocol::StatementRequest;
use erp_shared::table::{Column, TableSpec, rows_from_serialize};
use leptos::prelude::*;

use crate::api::{api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::{Field, optional_text};
use crate::components::status::{Status, StatusLine, track};

/// 可选的 `YYYY-MM-DD` 输入，`Err` 携带字段标签
fn parse_date(value: RwSignal<String>, label: &str) -> Result<Option<NaiveDate>, String> {
    match optional_text(value) {
        None => Ok(None),
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{} inválida, use AAAA-MM-DD.", label)),
    }
}

#[component]
pub fn StatementPage() -> impl IntoView {
    let auth = use_auth();

    let product_id = RwSignal::new(String::new());
    let from_date = RwSignal::new(String::new());
    let to_date = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);
    let table = RwSignal::new(Option::<TableSpec>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = product_id
            .get_untracked()
            .trim()
            .parse::<i64>()
            .map_err(|_| "Produto deve ser um ID numérico.".to_string())
            .and_then(|product_id| {
                Ok(StatementRequest {
                    product_id,
                    from_date: parse_date(from_date, "Data inicial")?,
                    to_date: parse_date(to_date, "Data final")?,
                })
            });
        let req = match req {
            Ok(req) => req,
            Err(text) => {
                status.set(Status::Err(text));
                return;
            }
        };
        let api = api_client(&auth);
        track(status, async move {
            let statement = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao carregar extrato", &e))?;
            table.set(Some(
                TableSpec::new(
                    vec![
                        Column::new("created_at", "Data"),
                        Column::new("type", "Tipo"),
                        Column::new("quantity", "Quantidade"),
                        Column::new("signed_quantity", "Efeito"),
                        Column::new("balance_after", "Saldo após"),
                        Column::new("note", "Observação"),
                    ],
                    rows_from_serialize(&statement.lines),
                )
                .with_empty_text("Nenhuma movimentação no período."),
            ));
            Ok(format!(
                "Saldo inicial {} · saldo final {}",
                statement.starting_balance, statement.ending_balance
            ))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="Produto (ID)" value=product_id kind="number" />
            <Field label="De" value=from_date kind="date" />
            <Field label="Até" value=to_date kind="date" />
            <button class="btn btn-primary btn-sm" disabled=move || status.get().is_busy()>
                "Consultar"
            </button>
        </form>
        <StatusLine status=status />
        {move || table.get().map(|spec| view! { <DataTable spec=spec /> })}
    }
}
