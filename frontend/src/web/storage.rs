//! 存储封装模块
//!
//! 在 [`KeyValueStore`] 接缝后面提供 `localStorage` / `sessionStorage`。

use erp_client::KeyValueStore;

/// 浏览器存储区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebStorage {
    /// 刷新和重启后依然保留
    Local,
    /// 随标签页清除
    Session,
}

impl WebStorage {
    fn storage(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        match self {
            WebStorage::Local => window.local_storage().ok()?,
            WebStorage::Session => window.session_storage().ok()?,
        }
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        self.storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}
