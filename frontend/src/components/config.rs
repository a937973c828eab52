use erp_shared::protocol::{HealthRequest, ListRoutesRequest};
use erp_shared::table::{Column, TableSpec, rows_from_value};
use leptos::prelude::*;
use serde_json::{Value, json};

use crate::api::{api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::Field;
use crate::components::status::{Status, StatusLine, track};

/// API 地址编辑与连通性检查
#[component]
pub fn ConfigPage() -> impl IntoView {
    let auth = use_auth();

    let base = RwSignal::new(auth.api_base.get_untracked());
    let save_status = RwSignal::new(Status::Idle);
    let health_status = RwSignal::new(Status::Idle);
    let routes = RwSignal::new(Option::<TableSpec>::None);

    let on_save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let stored = auth.session().set_api_base(&base.get_untracked());
        base.set(stored.clone());
        save_status.set(if stored.is_empty() {
            Status::Err("API Base removida.".to_string())
        } else {
            Status::Ok(format!("API Base salva: {}", stored))
        });
    };

    let on_health = move |_| {
        let api = api_client(&auth);
        track(health_status, async move {
            let body = api
                .call(&HealthRequest)
                .await
                .map_err(|e| error_text("Falha no health check", &e))?;
            Ok(format!("API respondeu: {}", body))
        });
    };

    let on_routes = move |_| {
        let api = api_client(&auth);
        track(health_status, async move {
            let paths = api
                .call(&ListRoutesRequest)
                .await
                .map_err(|e| error_text("Falha ao listar rotas", &e))?;
            let count = paths.len();
            let rows = rows_from_value(Value::Array(
                paths.into_iter().map(|path| json!({ "path": path })).collect(),
            ));
            routes.set(Some(
                TableSpec::new(vec![Column::new("path", "Rota")], rows)
                    .with_empty_text("Nenhuma rota exposta."),
            ));
            Ok(format!("{} rotas.", count))
        });
    };

    view! {
        <form class="space-y-3" on:submit=on_save>
            <Field label="API Base" value=base placeholder="http://localhost:8000" />
            <button class="btn btn-primary btn-sm">"Salvar"</button>
            <StatusLine status=save_status />
        </form>
        <div class="divider"></div>
        <div class="flex gap-2">
            <button class="btn btn-sm" on:click=on_health disabled=move || health_status.get().is_busy()>
                "Testar conexão"
            </button>
            <button class="btn btn-sm" on:click=on_routes disabled=move || health_status.get().is_busy()>
                "Listar rotas"
            </button>
        </div>
        <StatusLine status=health_status />
        {move || routes.get().map(|spec| view! { <DataTable spec=spec /> })}
    }
}
