use erp_shared::Category;
use erp_shared::protocol::{CreateCategoryRequest, ListCategoriesRequest, UpdateCategoryRequest};
use erp_shared::table::{Column, TableSpec, rows_from_serialize};
use leptos::prelude::*;
use serde_json::Value;

use crate::api::{Api, api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::{Field, optional_number, optional_text};
use crate::components::status::{Status, StatusLine, track};

fn categories_table(categories: &[Category]) -> TableSpec {
    TableSpec::new(
        vec![
            Column::new("id", "ID"),
            Column::new("name", "Nome"),
            Column::new("auto_discount_enabled", "Desconto automático").with_formatter(|v, _| {
                match v.as_bool() {
                    Some(true) => "Sim".to_string(),
                    _ => "Não".to_string(),
                }
            }),
            Column::new("default_discount_percent", "Desconto padrão").with_formatter(
                |v, _| match v {
                    Value::Number(n) => format!("{}%", n),
                    _ => String::new(),
                },
            ),
        ],
        rows_from_serialize(categories),
    )
    .with_filter_keys(["name"])
    .with_empty_text("Nenhuma categoria cadastrada.")
}

fn load(api: Api, status: RwSignal<Status>, table: RwSignal<Option<TableSpec>>) {
    track(status, async move {
        let categories = api
            .call(&ListCategoriesRequest)
            .await
            .map_err(|e| error_text("Falha ao carregar categorias", &e))?;
        let count = categories.len();
        table.set(Some(categories_table(&categories)));
        Ok(format!("{} categorias.", count))
    });
}

#[component]
pub fn CategoriesPage() -> impl IntoView {
    let auth = use_auth();

    let name = RwSignal::new(String::new());
    let auto_discount = RwSignal::new(false);
    let discount = RwSignal::new("0".to_string());
    let form_status = RwSignal::new(Status::Idle);
    let list_status = RwSignal::new(Status::Idle);
    let table = RwSignal::new(Option::<TableSpec>::None);

    load(api_client(&auth), list_status, table);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Ok(percent) = discount.get_untracked().trim().replace(',', ".").parse::<f64>() else {
            form_status.set(Status::Err("Desconto deve ser um número.".to_string()));
            return;
        };
        let req = CreateCategoryRequest {
            name: name.get_untracked().trim().to_string(),
            auto_discount_enabled: auto_discount.get_untracked(),
            default_discount_percent: percent,
        };
        let api = api_client(&auth);
        track(form_status, async move {
            let category = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao criar categoria", &e))?;
            load(api, list_status, table);
            Ok(format!("Categoria {} criada.", category.name))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="Nome" value=name />
            <Field label="Desconto padrão (%)" value=discount kind="number" />
            <label class="label cursor-pointer gap-2">
                <input
                    type="checkbox"
                    class="checkbox checkbox-sm"
                    prop:checked=move || auto_discount.get()
                    on:change=move |ev| auto_discount.set(event_target_checked(&ev))
                />
                <span class="label-text">"Desconto automático"</span>
            </label>
            <button class="btn btn-primary btn-sm" disabled=move || form_status.get().is_busy()>
                "Criar"
            </button>
        </form>
        <StatusLine status=form_status />
        <div class="divider"></div>
        <CategoryEditForm list_status=list_status table=table />
        <div class="divider"></div>
        <button class="btn btn-sm" on:click=move |_| load(api_client(&auth), list_status, table)>
            "Atualizar"
        </button>
        <StatusLine status=list_status />
        {move || table.get().map(|spec| view! { <DataTable spec=spec /> })}
    }
}

#[component]
fn CategoryEditForm(list_status: RwSignal<Status>, table: RwSignal<Option<TableSpec>>) -> impl IntoView {
    let auth = use_auth();

    let id = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let discount = RwSignal::new(String::new());
    // "" 保持不变，"on" / "off" 修改开关
    let auto_discount = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Ok(Some(category_id)) = optional_number::<i64>(id) else {
            status.set(Status::Err("Informe o ID da categoria.".to_string()));
            return;
        };
        let Ok(percent) = optional_number::<f64>(discount) else {
            status.set(Status::Err("Desconto deve ser um número.".to_string()));
            return;
        };
        let req = UpdateCategoryRequest {
            id: category_id,
            name: optional_text(name),
            auto_discount_enabled: match auto_discount.get_untracked().as_str() {
                "on" => Some(true),
                "off" => Some(false),
                _ => None,
            },
            default_discount_percent: percent,
        };
        let api = api_client(&auth);
        track(status, async move {
            let category = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao atualizar categoria", &e))?;
            load(api, list_status, table);
            Ok(format!("Categoria {} atualizada.", category.name))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="ID" value=id kind="number" />
            <Field label="Novo nome" value=name />
            <Field label="Novo desconto (%)" value=discount />
            <label class="form-control w-full max-w-xs">
                <span class="label-text">"Desconto automático"</span>
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| auto_discount.set(event_target_value(&ev))
                >
                    <option value="">"Manter"</option>
                    <option value="on">"Ativar"</option>
                    <option value="off">"Desativar"</option>
                </select>
            </label>
            <button class="btn btn-sm" disabled=move || status.get().is_busy()>
                "Salvar"
            </button>
        </form>
        <StatusLine status=status />
    }
}
