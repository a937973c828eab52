use erp_shared::HEADER_CONTENT_TYPE;
use std::fmt;

pub use erp_shared::protocol::HttpMethod;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 交给 [`HttpClient`] 的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    /// 请求头名称唯一，不区分大小写
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// 设置请求头，同名时覆盖
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((key.to_string(), value.to_string())),
        }
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(HEADER_CONTENT_TYPE)
    }
}

/// 原始响应：状态码和文本形式的响应体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: String::new(),
            body: body.into(),
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 拿到响应之前的本地失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 无法构建请求
    RequestBuildFailed(String),
    /// 网络调用失败或被中止
    NetworkError(String),
    /// 无法读取响应体
    ResponseReadFailed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::RequestBuildFailed(msg) => write!(f, "Falha ao montar requisição: {}", msg),
            TransportError::NetworkError(msg) => write!(f, "Falha de rede: {}", msg),
            TransportError::ResponseReadFailed(msg) => write!(f, "Falha ao ler resposta: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// HTTP 客户端 trait
///
/// 浏览器句柄不是 `Send`，因此使用 `?Send`。
/// 丢弃返回的 future 必须中止进行中的请求。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}
