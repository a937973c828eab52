use super::*;
use crate::session::MemoryStore;
use erp_shared::protocol::{
    CreateCategoryRequest, DeleteQuoteItemRequest, ListProductsRequest, StatementRequest,
    UpdateQuoteItemRequest,
};
use futures::FutureExt;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

// --- Fakes ---

enum Reply {
    Respond(HttpResponse),
    Fail(TransportError),
    /// 永不完成；被丢弃时记录中止
    Hang,
}

#[derive(Default)]
struct Script {
    replies: RefCell<VecDeque<Reply>>,
    requests: RefCell<Vec<HttpRequest>>,
    aborted: Rc<Cell<bool>>,
}

#[derive(Clone, Default)]
struct ScriptedClient {
    state: Rc<Script>,
}

impl ScriptedClient {
    fn replying(reply: Reply) -> Self {
        let client = Self::default();
        client.state.replies.borrow_mut().push_back(reply);
        client
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.state.requests.borrow().clone()
    }

    fn aborted(&self) -> bool {
        self.state.aborted.get()
    }
}

struct AbortFlag(Rc<Cell<bool>>);

impl Drop for AbortFlag {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for ScriptedClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.state.requests.borrow_mut().push(req);
        let reply = self.state.replies.borrow_mut().pop_front();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Hang) | None => {
                let _flag = AbortFlag(self.state.aborted.clone());
                future::pending().await
            }
        }
    }
}

#[derive(Clone, Default)]
struct FakeTimer {
    /// `sleep` 是否立即完成
    fire: bool,
    live: Rc<Cell<usize>>,
    requested: Rc<RefCell<Vec<Duration>>>,
}

struct LiveTimer(Rc<Cell<usize>>);

impl Drop for LiveTimer {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Timer for FakeTimer {
    fn sleep(&self, duration: Duration) -> futures::future::LocalBoxFuture<'static, ()> {
        self.requested.borrow_mut().push(duration);
        self.live.set(self.live.get() + 1);
        let guard = LiveTimer(self.live.clone());
        if self.fire {
            async move {
                let _guard = guard;
            }
            .boxed_local()
        } else {
            async move {
                let _guard = guard;
                future::pending::<()>().await
            }
            .boxed_local()
        }
    }
}

struct Harness {
    api: ApiClient<ScriptedClient, FakeTimer>,
    http: ScriptedClient,
    timer: FakeTimer,
    session: SessionStore,
}

fn harness(http: ScriptedClient, timer: FakeTimer) -> Harness {
    let config = ClientConfig::default();
    let session = SessionStore::new(Rc::new(MemoryStore::new()), &config);
    let api = ApiClient::new(http.clone(), timer.clone(), session.clone(), &config);
    Harness {
        api,
        http,
        timer,
        session,
    }
}

fn respond(status: u16, body: &str) -> ScriptedClient {
    ScriptedClient::replying(Reply::Respond(HttpResponse::new(status, body)))
}

// --- Tests ---

#[tokio::test]
async fn test_empty_base_never_reaches_network() {
    let h = harness(respond(200, "{}"), FakeTimer::default());
    h.session.set_api_base("");

    let err = h.api.request("/products", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err.kind(), crate::ApiErrorKind::Config);
    assert_eq!(err.message(), "API Base vazia");
    assert!(h.http.requests().is_empty());
    assert!(h.timer.requested.borrow().is_empty());
}

#[tokio::test]
async fn test_success_attaches_json_and_bearer_headers() {
    let h = harness(respond(200, r#"[{"id":1,"sku":"A-1"}]"#), FakeTimer::default());
    h.session.set_token("abc");

    let value = h.api.request("/products", RequestOptions::get()).await.unwrap();

    assert_eq!(value, json!([{"id": 1, "sku": "A-1"}]));
    let sent = h.http.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "http://localhost:8000/products");
    assert_eq!(sent[0].method, HttpMethod::Get);
    assert_eq!(sent[0].content_type(), Some("application/json"));
    assert_eq!(sent[0].header("authorization"), Some("Bearer abc"));
    assert_eq!(h.timer.live.get(), 0);
}

#[tokio::test]
async fn test_no_authorization_without_token_and_get_drops_body() {
    let h = harness(respond(200, "{}"), FakeTimer::default());

    h.api
        .request("/health", RequestOptions::get().with_body(json!({"x": 1})))
        .await
        .unwrap();

    let sent = h.http.requests();
    assert_eq!(sent[0].header(HEADER_AUTHORIZATION), None);
    assert_eq!(sent[0].body, None);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let h = harness(respond(201, r#"{"id":7}"#), FakeTimer::default());

    let options = RequestOptions::new(HttpMethod::Post).with_body(json!({"name": "Bebidas"}));
    let value = h.api.request("/categories", options).await.unwrap();

    assert_eq!(value["id"], 7);
    let body = h.http.requests()[0].body.clone().unwrap();
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"name": "Bebidas"}));
}

#[tokio::test]
async fn test_caller_headers_override_but_keep_content_type() {
    let h = harness(respond(200, "{}"), FakeTimer::default());
    h.session.set_token("stale");

    let options = RequestOptions::new(HttpMethod::Post)
        .with_header("authorization", "Bearer explicit")
        .with_header("content-type", "")
        .with_header("X-Trace", "1");
    h.api.request("/auth/logout", options).await.unwrap();

    let sent = &h.http.requests()[0];
    assert_eq!(sent.header(HEADER_AUTHORIZATION), Some("Bearer explicit"));
    assert_eq!(sent.content_type(), Some("application/json"));
    assert_eq!(sent.header("x-trace"), Some("1"));
    assert_eq!(sent.headers.len(), 3);
}

#[tokio::test]
async fn test_non_json_and_empty_bodies() {
    let h = harness(respond(200, "pong"), FakeTimer::default());
    let value = h.api.request("/health", RequestOptions::get()).await.unwrap();
    assert_eq!(value, json!({"raw": "pong"}));

    let h = harness(respond(204, ""), FakeTimer::default());
    let value = h.api.request("/health", RequestOptions::get()).await.unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_http_error_uses_server_detail() {
    let h = harness(
        respond(404, r#"{"detail":"Produto não encontrado"}"#),
        FakeTimer::default(),
    );

    let err = h.api.request("/products/9", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err.kind(), crate::ApiErrorKind::Http);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.message(), "404 Produto não encontrado");
    assert_eq!(err.detail(), Some(&json!({"detail": "Produto não encontrado"})));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_http_error_with_structured_detail() {
    let h = harness(
        respond(409, r#"{"detail":{"message":"SKU já cadastrado","sku":"A-1"}}"#),
        FakeTimer::default(),
    );

    let err = h.api.request("/products", RequestOptions::new(HttpMethod::Post)).await.unwrap_err();

    assert_eq!(err.message(), "409 SKU já cadastrado");
}

#[tokio::test]
async fn test_http_error_falls_back_to_status_text() {
    let http = ScriptedClient::replying(Reply::Respond(
        HttpResponse::new(500, "").with_status_text("Internal Server Error"),
    ));
    let h = harness(http, FakeTimer::default());

    let err = h.api.request("/stock/balance", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err.message(), "500 Internal Server Error");
    assert_eq!(err.detail(), None);
    assert!(err.is_server_error());
    assert_eq!(h.http.requests().len(), 1);
}

#[tokio::test]
async fn test_unauthorized_clears_token_before_returning() {
    let h = harness(
        respond(401, r#"{"detail":"Token inválido"}"#),
        FakeTimer::default(),
    );
    h.session.set_token("expired");
    let cleared = Rc::new(Cell::new(false));
    let flag = cleared.clone();
    h.session.watch(move |e| {
        if *e == crate::SessionEvent::TokenCleared {
            flag.set(true);
        }
    });

    let err = h.api.request("/auth/me", RequestOptions::get()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message(), "401 Token inválido");
    assert!(!h.session.is_authenticated());
    assert!(cleared.get());
}

#[tokio::test]
async fn test_network_failure_is_transport_error() {
    let h = harness(
        ScriptedClient::replying(Reply::Fail(TransportError::NetworkError(
            "Failed to fetch".into(),
        ))),
        FakeTimer::default(),
    );
    h.session.set_token("abc");

    let err = h.api.request("/products", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err.kind(), crate::ApiErrorKind::Network);
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
    // 只有 401 会使会话失效
    assert!(h.session.is_authenticated());
    assert_eq!(h.timer.live.get(), 0);
}

#[tokio::test]
async fn test_timeout_aborts_request_and_releases_timer() {
    let timer = FakeTimer {
        fire: true,
        ..FakeTimer::default()
    };
    let h = harness(ScriptedClient::replying(Reply::Hang), timer);

    let err = h.api.request("/stock/movements", RequestOptions::get()).await.unwrap_err();

    assert_eq!(err.kind(), crate::ApiErrorKind::Timeout);
    assert!(err.is_transport());
    assert!(h.http.aborted());
    assert_eq!(h.timer.live.get(), 0);
    assert_eq!(*h.timer.requested.borrow(), vec![Duration::from_millis(15_000)]);
    assert_eq!(h.http.requests().len(), 1);
}

#[tokio::test]
async fn test_typed_call_decodes_response() {
    let h = harness(
        respond(
            200,
            r#"[{"id":1,"sku":"A-1","name":"Arroz","unit":"kg","category_id":null}]"#,
        ),
        FakeTimer::default(),
    );

    let products = h.api.call(&ListProductsRequest).await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku, "A-1");
    assert_eq!(h.http.requests()[0].body, None);
}

#[tokio::test]
async fn test_typed_call_sends_body_and_query() {
    let h = harness(
        respond(200, r#"{"id":3,"name":"Bebidas","auto_discount_enabled":false,"default_discount_percent":0.0}"#),
        FakeTimer::default(),
    );
    let req = CreateCategoryRequest {
        name: "Bebidas".into(),
        auto_discount_enabled: false,
        default_discount_percent: 0.0,
    };
    let category = h.api.call(&req).await.unwrap();
    assert_eq!(category.name, "Bebidas");
    let body = h.http.requests()[0].body.clone().unwrap();
    assert!(body.contains("\"name\":\"Bebidas\""));

    let h = harness(respond(500, ""), FakeTimer::default());
    let req = StatementRequest {
        product_id: 4,
        from_date: None,
        to_date: None,
    };
    let _ = h.api.call(&req).await;
    assert_eq!(
        h.http.requests()[0].url,
        "http://localhost:8000/stock/statement?product_id=4"
    );
}

#[tokio::test]
async fn test_patch_sends_partial_body_delete_sends_none() {
    let h = harness(
        respond(
            200,
            r#"{"id":11,"quote_id":4,"product_id":2,"sku_snapshot":"P-2","name_snapshot":"Parafuso",
                "unit_snapshot":"UN","quantity":5.0,"unit_price":10.0,"discount_percent":0.0,
                "gross_total":50.0,"discount_total":0.0,"net_total":50.0}"#,
        ),
        FakeTimer::default(),
    );
    let req = UpdateQuoteItemRequest {
        quote_id: 4,
        item_id: 11,
        quantity: Some(5.0),
        ..Default::default()
    };
    let item = h.api.call(&req).await.unwrap();
    assert_eq!(item.net_total, 50.0);

    let sent = &h.http.requests()[0];
    assert_eq!(sent.method, HttpMethod::Patch);
    assert_eq!(sent.url, "http://localhost:8000/quotes/4/items/11");
    assert_eq!(sent.body.as_deref(), Some(r#"{"quantity":5.0}"#));

    let h = harness(respond(200, r#"{"ok":true}"#), FakeTimer::default());
    let ack = h
        .api
        .call(&DeleteQuoteItemRequest {
            quote_id: 4,
            item_id: 11,
        })
        .await
        .unwrap();
    assert!(ack.ok);

    let sent = &h.http.requests()[0];
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.url, "http://localhost:8000/quotes/4/items/11");
    assert_eq!(sent.body, None);
}

#[tokio::test]
async fn test_typed_call_reports_shape_mismatch() {
    let h = harness(respond(200, r#"{"unexpected":true}"#), FakeTimer::default());

    let err = h.api.call(&ListProductsRequest).await.unwrap_err();

    assert_eq!(err.kind(), crate::ApiErrorKind::Decode);
    assert_eq!(err.detail(), Some(&json!({"unexpected": true})));
}
