use erp_shared::Quote;
use erp_shared::protocol::{CreateQuoteRequest, ListQuotesRequest};
use erp_shared::table::{Column, TableSpec, rows_from_serialize};
use leptos::prelude::*;
use serde_json::Value;

use crate::api::{Api, api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::{Field, optional_text};
use crate::components::quote_detail::QuoteDetailPanel;
use crate::components::status::{Status, StatusLine, track};

const DEFAULT_VALID_DAYS: u32 = 7;

pub(crate) fn money(value: &Value) -> String {
    value
        .as_f64()
        .map(|v| format!("R$ {:.2}", v))
        .unwrap_or_default()
}

fn quotes_table(quotes: &[Quote]) -> TableSpec {
    TableSpec::new(
        vec![
            Column::new("id", "ID"),
            Column::new("customer_name", "Cliente"),
            Column::new("status", "Status"),
            Column::new("issued_at", "Emissão"),
            Column::new("valid_until", "Validade"),
            Column::new("total_net", "Total").with_formatter(|v, _| money(v)),
        ],
        rows_from_serialize(quotes),
    )
    .with_filter_keys(["customer_name", "customer_email", "status"])
    .with_empty_text("Nenhum orçamento criado.")
}

fn load(api: Api, status: RwSignal<Status>, table: RwSignal<Option<TableSpec>>) {
    track(status, async move {
        let quotes = api
            .call(&ListQuotesRequest)
            .await
            .map_err(|e| error_text("Falha ao carregar orçamentos", &e))?;
        let count = quotes.len();
        table.set(Some(quotes_table(&quotes)));
        Ok(format!("{} orçamentos.", count))
    });
}

#[component]
pub fn QuotesPage() -> impl IntoView {
    let auth = use_auth();

    let customer_name = RwSignal::new(String::new());
    let customer_email = RwSignal::new(String::new());
    let valid_days = RwSignal::new(DEFAULT_VALID_DAYS.to_string());
    let notes = RwSignal::new(String::new());
    let form_status = RwSignal::new(Status::Idle);
    let list_status = RwSignal::new(Status::Idle);
    let table = RwSignal::new(Option::<TableSpec>::None);

    load(api_client(&auth), list_status, table);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Ok(valid_days) = valid_days.get_untracked().trim().parse::<u32>() else {
            form_status.set(Status::Err("Validade deve ser um número de dias.".to_string()));
            return;
        };
        let req = CreateQuoteRequest {
            customer_name: customer_name.get_untracked().trim().to_string(),
            customer_email: optional_text(customer_email),
            valid_days,
            notes: optional_text(notes),
        };
        let api = api_client(&auth);
        track(form_status, async move {
            let quote = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao criar orçamento", &e))?;
            load(api, list_status, table);
            Ok(format!("Orçamento {} criado para {}.", quote.id, quote.customer_name))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="Cliente" value=customer_name />
            <Field label="E-mail do cliente" value=customer_email kind="email" />
            <Field label="Validade (dias)" value=valid_days kind="number" />
            <Field label="Observações" value=notes />
            <button class="btn btn-primary btn-sm" disabled=move || form_status.get().is_busy()>
                "Criar"
            </button>
        </form>
        <StatusLine status=form_status />
        <div class="divider"></div>
        <button class="btn btn-sm" on:click=move |_| load(api_client(&auth), list_status, table)>
            "Atualizar"
        </button>
        <StatusLine status=list_status />
        {move || table.get().map(|spec| view! { <DataTable spec=spec /> })}
        <div class="divider"></div>
        <QuoteDetailPanel on_change={Callback::new(move |_| load(api_client(&auth), list_status, table))} />
    }
}
