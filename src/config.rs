use std::time::Duration;

// 默认值，可在编译期通过环境变量覆盖
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_API_BASE_KEY: &str = "erp_api_base";
pub const DEFAULT_TOKEN_KEY: &str = "erp_token";
pub const DEFAULT_FLASH_KEY: &str = "erp_flash";

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// 尚未持久化 API 地址时写入的初始值
    pub default_api_base: String,
    pub request_timeout: Duration,
    /// API 地址的持久化键
    pub api_base_key: String,
    /// 令牌的持久化键
    pub token_key: String,
    /// 闪现消息的会话级键
    pub flash_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            api_base_key: DEFAULT_API_BASE_KEY.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            flash_key: DEFAULT_FLASH_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// 读取编译期捕获的 `ERP_API_BASE` 与 `ERP_REQUEST_TIMEOUT_MS`
    pub fn from_build_env() -> Self {
        Self::from_overrides(option_env!("ERP_API_BASE"), option_env!("ERP_REQUEST_TIMEOUT_MS"))
    }

    fn from_overrides(api_base: Option<&str>, timeout_ms: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            default_api_base: api_base
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.default_api_base),
            request_timeout: timeout_ms
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.default_api_base, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_millis(15_000));
    }

    #[test]
    fn test_overrides_fall_back_on_garbage() {
        let config = ClientConfig::from_overrides(Some(" https://erp.example.com "), Some("abc"));
        assert_eq!(config.default_api_base, "https://erp.example.com");
        assert_eq!(config.request_timeout, Duration::from_millis(15_000));

        let config = ClientConfig::from_overrides(Some(""), Some("500"));
        assert_eq!(config.default_api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout, Duration::from_millis(500));
    }
}
