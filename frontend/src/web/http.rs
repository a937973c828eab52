//! HTTP 传输模块
//!
//! 使用 `web_sys::fetch`，每次调用持有一个 `AbortController`。
//! 丢弃进行中的 future（例如超时赢得竞速）会中止浏览器请求。

use erp_client::{HttpClient, HttpRequest, HttpResponse, TransportError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

/// 读取响应体后解除；否则在丢弃时中止请求
struct AbortOnDrop {
    controller: AbortController,
    armed: bool,
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abort();
        }
    }
}

/// 基于 `window.fetch` 的浏览器 HTTP 客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

fn js_error(e: JsValue) -> String {
    e.as_string()
        .or_else(|| {
            e.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{:?}", e))
}

impl FetchClient {
    fn build(req: &HttpRequest, controller: &AbortController) -> Result<Request, TransportError> {
        let headers = Headers::new()
            .map_err(|e| TransportError::RequestBuildFailed(format!("Headers: {}", js_error(e))))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| TransportError::RequestBuildFailed(format!("{}: {}", key, js_error(e))))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| TransportError::RequestBuildFailed(js_error(e)))
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller = AbortController::new()
            .map_err(|e| TransportError::RequestBuildFailed(js_error(e)))?;
        let request = Self::build(&req, &controller)?;
        let mut guard = AbortOnDrop {
            controller,
            armed: true,
        };

        let window = web_sys::window()
            .ok_or_else(|| TransportError::NetworkError("window indisponível".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| TransportError::NetworkError(js_error(e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| TransportError::ResponseReadFailed(js_error(e)))?;

        let promise = response
            .text()
            .map_err(|e| TransportError::ResponseReadFailed(js_error(e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| TransportError::ResponseReadFailed(js_error(e)))?;
        guard.armed = false;

        Ok(HttpResponse::new(response.status(), text.as_string().unwrap_or_default())
            .with_status_text(response.status_text()))
    }
}
