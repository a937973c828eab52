//! GenericERP 控制台的浏览器运行时核心
//!
//! 平台接缝（`HttpClient`、`Timer`、`KeyValueStore`）均为 trait，
//! 同一个 `ApiClient` 在浏览器中运行于 `fetch` 之上，在测试中运行于假实现之上。

// =========================================================
// 跨平台日志宏 (Logging Macros)
// =========================================================

#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => ($crate::log::emit($crate::log::Level::Info, &format!($($t)*)))
}

#[macro_export]
macro_rules! log_warn {
    ($($t:tt)*) => ($crate::log::emit($crate::log::Level::Warn, &format!($($t)*)))
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => ($crate::log::emit($crate::log::Level::Error, &format!($($t)*)))
}

pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod navigation;
pub mod notice;
pub mod request;
pub mod session;
pub mod timer;

pub use api::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use navigation::{Landing, Navigator};
pub use notice::NoticeChannel;
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError};
pub use session::{KeyValueStore, MemoryStore, SessionEvent, SessionStore};
pub use timer::Timer;
