use erp_shared::Product;
use erp_shared::protocol::{CreateProductRequest, ListProductsRequest, UpdateProductRequest};
use erp_shared::table::{Column, TableSpec, rows_from_serialize};
use leptos::prelude::*;

use crate::api::{Api, api_client, error_text};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::field::{Field, optional_number, optional_text};
use crate::components::status::{Status, StatusLine, track};

fn products_table(products: &[Product]) -> TableSpec {
    TableSpec::new(
        vec![
            Column::new("id", "ID"),
            Column::new("sku", "SKU"),
            Column::new("name", "Nome"),
            Column::new("unit", "Unidade"),
            Column::new("price", "Preço"),
            Column::new("pack_factor", "Fator emb."),
            Column::new("category_id", "Categoria"),
        ],
        rows_from_serialize(products),
    )
    .with_filter_keys(["sku", "name"])
    .with_empty_text("Nenhum produto cadastrado.")
}

fn load(api: Api, status: RwSignal<Status>, table: RwSignal<Option<TableSpec>>) {
    track(status, async move {
        let products = api
            .call(&ListProductsRequest)
            .await
            .map_err(|e| error_text("Falha ao carregar produtos", &e))?;
        let count = products.len();
        table.set(Some(products_table(&products)));
        Ok(format!("{} produtos.", count))
    });
}

#[component]
pub fn ProductsPage() -> impl IntoView {
    let auth = use_auth();

    let sku = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let unit = RwSignal::new("un".to_string());
    let category_id = RwSignal::new(String::new());
    let price = RwSignal::new(String::new());
    let pack_factor = RwSignal::new(String::new());
    let form_status = RwSignal::new(Status::Idle);
    let list_status = RwSignal::new(Status::Idle);
    let table = RwSignal::new(Option::<TableSpec>::None);

    load(api_client(&auth), list_status, table);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (Ok(category_id), Ok(price), Ok(pack_factor)) = (
            optional_number::<i64>(category_id),
            optional_number::<f64>(price),
            optional_number::<f64>(pack_factor),
        ) else {
            form_status.set(Status::Err(
                "Categoria, preço e fator devem ser números.".to_string(),
            ));
            return;
        };
        let req = CreateProductRequest {
            sku: sku.get_untracked().trim().to_string(),
            name: name.get_untracked().trim().to_string(),
            unit: unit.get_untracked().trim().to_string(),
            category_id,
            price,
            pack_factor,
        };
        let api = api_client(&auth);
        track(form_status, async move {
            let product = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao criar produto", &e))?;
            load(api, list_status, table);
            Ok(format!("Produto {} criado.", product.sku))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="SKU" value=sku />
            <Field label="Nome" value=name />
            <Field label="Unidade" value=unit />
            <Field label="Categoria (ID)" value=category_id kind="number" />
            <Field label="Preço" value=price placeholder="0,00" />
            <Field label="Fator de embalagem" value=pack_factor placeholder="1" />
            <button class="btn btn-primary btn-sm" disabled=move || form_status.get().is_busy()>
                "Criar"
            </button>
        </form>
        <StatusLine status=form_status />
        <div class="divider"></div>
        <ProductEditForm list_status=list_status table=table />
        <div class="divider"></div>
        <button class="btn btn-sm" on:click=move |_| load(api_client(&auth), list_status, table)>
            "Atualizar"
        </button>
        <StatusLine status=list_status />
        {move || table.get().map(|spec| view! { <DataTable spec=spec /> })}
    }
}

/// 只修改填写了的字段
#[component]
fn ProductEditForm(list_status: RwSignal<Status>, table: RwSignal<Option<TableSpec>>) -> impl IntoView {
    let auth = use_auth();

    let id = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let unit = RwSignal::new(String::new());
    let price = RwSignal::new(String::new());
    let category_id = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Ok(Some(product_id)) = optional_number::<i64>(id) else {
            status.set(Status::Err("Informe o ID do produto.".to_string()));
            return;
        };
        let (Ok(price), Ok(category_id)) =
            (optional_number::<f64>(price), optional_number::<i64>(category_id))
        else {
            status.set(Status::Err("Preço e categoria devem ser números.".to_string()));
            return;
        };
        let req = UpdateProductRequest {
            id: product_id,
            name: optional_text(name),
            unit: optional_text(unit),
            price,
            category_id,
            ..Default::default()
        };
        let api = api_client(&auth);
        track(status, async move {
            let product = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha ao atualizar produto", &e))?;
            load(api, list_status, table);
            Ok(format!("Produto {} atualizado.", product.sku))
        });
    };

    view! {
        <form class="flex flex-wrap gap-3 items-end" on:submit=on_submit>
            <Field label="ID" value=id kind="number" />
            <Field label="Novo nome" value=name />
            <Field label="Nova unidade" value=unit />
            <Field label="Novo preço" value=price />
            <Field label="Nova categoria (ID)" value=category_id kind="number" />
            <button class="btn btn-sm" disabled=move || status.get().is_busy()>
                "Salvar"
            </button>
        </form>
        <StatusLine status=status />
    }
}
