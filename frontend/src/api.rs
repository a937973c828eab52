//! 把运行时核心接到浏览器实现上

use std::rc::Rc;

use erp_client::{ApiClient, ClientConfig, NoticeChannel};

use crate::auth::AuthContext;
use crate::web::{FetchClient, WebStorage, WebTimer};

/// 运行在 `fetch` 与 `setTimeout` 之上的 API 客户端
pub type Api = ApiClient<FetchClient, WebTimer>;

pub fn config() -> ClientConfig {
    ClientConfig::from_build_env()
}

/// 绑定当前会话的客户端，每次操作构建一个即可
pub fn api_client(auth: &AuthContext) -> Api {
    ApiClient::new(FetchClient, WebTimer, auth.session(), &config())
}

/// 闪现消息保存在 `sessionStorage`
pub fn notices() -> NoticeChannel {
    NoticeChannel::new(Rc::new(WebStorage::Session), &config())
}

/// 显示在失败操作下方的错误文本
pub fn error_text(action: &str, e: &erp_client::ApiError) -> String {
    format!("{}: {}", action, e)
}
