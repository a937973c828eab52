use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::request::TransportError;

/// 未配置 API 地址时的错误消息
pub const EMPTY_API_BASE: &str = "API Base vazia";

// =========================================================
// 错误类别 (Error Kind)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 未配置 API 地址，请求不会发出
    Config,
    /// 网络失败，没有响应
    Network,
    /// 超时后请求被中止
    Timeout,
    /// 401 以外的非 2xx 状态
    Http,
    /// 401：凭证被拒绝，令牌已清除
    Unauthorized,
    /// 2xx 响应体与期望类型不符
    Decode,
}

impl ApiErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Config => "CONFIG",
            ApiErrorKind::Network => "NETWORK",
            ApiErrorKind::Timeout => "TIMEOUT",
            ApiErrorKind::Http => "HTTP",
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::Decode => "DECODE",
        }
    }
}

// =========================================================
// 核心错误类型 (ApiError)
// =========================================================

/// API 调用失败的统一表示
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<u16>,
    message: String,
    /// 服务端返回的响应体（已解析）
    detail: Option<Value>,
}

impl ApiError {
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            detail: None,
        }
    }

    // --- 便捷构造 ---

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Config, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ApiErrorKind::Timeout,
            format!(
                "Requisição abortada: tempo limite de {} ms excedido",
                after.as_millis()
            ),
        )
    }

    /// 非 2xx 响应。401 映射为 [`ApiErrorKind::Unauthorized`]
    pub fn http(status: u16, message: impl Into<String>, detail: Option<Value>) -> Self {
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        Self {
            kind,
            status: Some(status),
            message: message.into(),
            detail,
        }
    }

    pub fn decode(message: impl Into<String>, body: Value) -> Self {
        Self {
            detail: Some(body),
            ..Self::new(ApiErrorKind::Decode, message)
        }
    }

    // --- 访问器 ---

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// 没有服务端响应（网络失败或超时）
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network | ApiErrorKind::Timeout)
    }

    /// 4xx，包括 401
    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(s) if (400..500).contains(&s))
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(s) if (500..600).contains(&s))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::network(e.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_taxonomy_predicates() {
        let config = ApiError::config(EMPTY_API_BASE);
        assert_eq!(config.kind(), ApiErrorKind::Config);
        assert!(!config.is_transport());
        assert_eq!(config.to_string(), "API Base vazia");

        let timeout = ApiError::timeout(Duration::from_millis(15_000));
        assert!(timeout.is_transport());
        assert!(timeout.message().contains("15000"));
        assert_eq!(timeout.status(), None);

        let validation = ApiError::http(422, "422 invalid", Some(json!({"detail": "invalid"})));
        assert!(validation.is_client_error());
        assert!(!validation.is_server_error());
        assert!(!validation.is_unauthorized());

        let auth = ApiError::http(401, "401 credenciais inválidas", None);
        assert_eq!(auth.kind(), ApiErrorKind::Unauthorized);
        assert!(auth.is_client_error());

        let server = ApiError::http(503, "503 Service Unavailable", None);
        assert!(server.is_server_error());
        assert_eq!(server.error_code(), "HTTP");
    }

    #[test]
    fn test_transport_error_maps_to_network() {
        let err: ApiError = TransportError::NetworkError("Failed to fetch".into()).into();
        assert_eq!(err.kind(), ApiErrorKind::Network);
        assert_eq!(err.message(), "Falha de rede: Failed to fetch");
    }
}
