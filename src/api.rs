use std::rc::Rc;
use std::time::Duration;

use erp_shared::protocol::ApiRequest;
use erp_shared::{BEARER_PREFIX, CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
use futures::future::{self, Either};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, EMPTY_API_BASE};
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError};
use crate::session::SessionStore;
use crate::timer::Timer;
use crate::{log_error, log_info, log_warn};

#[cfg(test)]
mod tests;

/// 单次调用选项，见 [`ApiClient::request`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    /// 覆盖默认请求头（名称不区分大小写）
    pub headers: Vec<(String, String)>,
    /// 以 JSON 发送；GET 请求忽略
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// ERP 后端的 JSON 客户端
///
/// 每次调用都从 [`SessionStore`] 读取 API 地址和令牌，
/// 其他地方的修改在下一次请求时立即生效。
pub struct ApiClient<H, T> {
    http: Rc<H>,
    timer: Rc<T>,
    session: SessionStore,
    timeout: Duration,
}

impl<H, T> Clone for ApiClient<H, T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            timer: self.timer.clone(),
            session: self.session.clone(),
            timeout: self.timeout,
        }
    }
}

impl<H: HttpClient, T: Timer> ApiClient<H, T> {
    pub fn new(http: H, timer: T, session: SessionStore, config: &ClientConfig) -> Self {
        Self {
            http: Rc::new(http),
            timer: Rc::new(timer),
            session,
            timeout: config.request_timeout,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// **核心方法：发送请求**
    ///
    /// 流程：检查 API 地址 -> 组装请求头 -> 与超时竞速 -> 解析响应体
    ///
    /// 不重试。API 地址为空时不发出任何请求，否则恰好发出一次。
    ///
    /// # 参数
    /// - `path`: 相对 API 地址的路径（可带查询串）
    /// - `options`: 方法、额外请求头和请求体
    ///
    /// # 返回
    /// - `Ok(Value)` 2xx 响应体；空响应体为 `null`
    /// - `Err(ApiError)` 配置、网络、超时或非 2xx 错误；401 时会先清除令牌
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        let base = self.session.get_api_base();
        if base.is_empty() {
            log_warn!("[Api] {} {}: {}", options.method.as_str(), path, EMPTY_API_BASE);
            return Err(ApiError::config(EMPTY_API_BASE));
        }

        let method = options.method;
        let req = self.build_request(&format!("{}{}", base, path), options);
        log_info!("[Api] {} {}", method.as_str(), path);

        let response = self.send_with_timeout(req).await.map_err(|e| {
            log_error!("[Api] {} {} failed: {}", method.as_str(), path, e);
            e
        })?;

        let body = parse_body(&response.body);
        if response.ok() {
            return Ok(body);
        }

        if response.status == 401 {
            // 凭证被拒绝：在调用方看到错误之前清除令牌
            self.session.clear_token();
        }
        let message = format!("{} {}", response.status, detail_text(&body, &response))
            .trim_end()
            .to_string();
        log_warn!("[Api] {} {} -> {}", method.as_str(), path, message);
        Err(ApiError::http(
            response.status,
            message,
            Some(body).filter(|b| !b.is_null()),
        ))
    }

    /// [`ApiClient::request`] 的强类型版本
    ///
    /// 路径和方法来自 [`ApiRequest`]；只有写操作才会序列化请求体。
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let mut options = RequestOptions::new(R::METHOD);
        if R::METHOD.has_body() {
            let body = serde_json::to_value(req)
                .map_err(|e| ApiError::from(TransportError::RequestBuildFailed(e.to_string())))?;
            options.body = Some(body);
        }
        let value = self.request(&req.path(), options).await?;
        serde_json::from_value(value.clone()).map_err(|e| {
            log_error!("[Api] unexpected response for {}: {}", R::PATH, e);
            ApiError::decode(format!("Resposta inesperada do servidor: {}", e), value)
        })
    }

    fn build_request(&self, url: &str, options: RequestOptions) -> HttpRequest {
        let mut req = HttpRequest::new(url, options.method)
            .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);
        if let Some(token) = self.session.get_token() {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("{}{}", BEARER_PREFIX, token));
        }
        for (key, value) in &options.headers {
            if key.eq_ignore_ascii_case(HEADER_CONTENT_TYPE) && value.trim().is_empty() {
                continue;
            }
            req = req.with_header(key, value);
        }
        match options.body {
            Some(body) if options.method != HttpMethod::Get => req.with_body(body.to_string()),
            _ => req,
        }
    }

    /// 传输与计时器竞速。落败的一方被丢弃：
    /// fetch 会被中止，或计时器被释放。
    async fn send_with_timeout(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let send = self.http.send(req);
        let sleep = self.timer.sleep(self.timeout);
        match future::select(send, sleep).await {
            Either::Left((result, pending_timer)) => {
                drop(pending_timer);
                result.map_err(ApiError::from)
            }
            Either::Right(((), pending_send)) => {
                drop(pending_send);
                Err(ApiError::timeout(self.timeout))
            }
        }
    }
}

/// 空文本解析为 `null`；非 JSON 文本包装为 `{"raw": text}`
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw": text }))
}

/// 错误原因：优先使用服务端的 `detail`，否则使用状态文本
fn detail_text(body: &Value, response: &HttpResponse) -> String {
    match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        Some(Value::Object(map)) => {
            if let Some(Value::String(s)) = map.get("message") {
                return s.clone();
            }
            return Value::Object(map.clone()).to_string();
        }
        Some(other) if !other.is_null() && other != &Value::String(String::new()) => {
            return other.to_string();
        }
        _ => {}
    }
    response.status_text.clone()
}
