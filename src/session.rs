//! 会话状态：令牌与 API 地址
//!
//! 二者保存在持久化的键值存储中，刷新页面后依然存在。
//! 所有修改都经过 [`SessionStore`]。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::config::ClientConfig;

/// 字符串键值存储（浏览器 `localStorage`、`sessionStorage` 或内存）
pub trait KeyValueStore {
    /// 读取值
    ///
    /// # 返回
    /// - `Some(String)` 如果键存在
    /// - `None` 如果键不存在或存储不可用
    fn get(&self, key: &str) -> Option<String>;
    /// 写入值
    ///
    /// # 返回
    /// - `false` 如果写入失败
    fn set(&self, key: &str, value: &str) -> bool;
    /// 删除键
    ///
    /// # 返回
    /// - `false` 如果删除失败
    fn delete(&self, key: &str) -> bool;
}

/// 内存存储，克隆体共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

/// 推送给 [`SessionStore::watch`] 监听器的变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TokenSet,
    TokenCleared,
    ApiBaseChanged(String),
}

type Listener = Rc<dyn Fn(&SessionEvent)>;

/// 会话的所有者，克隆体共享存储与监听器
#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStore>,
    token_key: String,
    api_base_key: String,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl SessionStore {
    /// 打开会话
    ///
    /// # 参数
    /// - `storage`: 持久化存储
    /// - `config`: 尚未保存 API 地址时，用其中的默认值初始化
    pub fn new(storage: Rc<dyn KeyValueStore>, config: &ClientConfig) -> Self {
        let store = Self {
            storage,
            token_key: config.token_key.clone(),
            api_base_key: config.api_base_key.clone(),
            listeners: Rc::new(RefCell::new(Vec::new())),
        };
        if store.storage.get(&store.api_base_key).is_none() {
            let base = normalize_api_base(&config.default_api_base);
            if !base.is_empty() {
                store.storage.set(&store.api_base_key, &base);
            }
        }
        store
    }

    pub fn get_token(&self) -> Option<String> {
        self.storage
            .get(&self.token_key)
            .filter(|t| !t.trim().is_empty())
    }

    /// 保存令牌；空白令牌等同于清除会话
    pub fn set_token(&self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            self.clear_token();
            return;
        }
        if !self.storage.set(&self.token_key, token) {
            crate::log_warn!("[Session] token could not be persisted");
        }
        crate::log_info!("[Session] token set");
        self.notify(&SessionEvent::TokenSet);
    }

    pub fn clear_token(&self) {
        let had_token = self.get_token().is_some();
        self.storage.delete(&self.token_key);
        if had_token {
            crate::log_info!("[Session] token cleared");
            self.notify(&SessionEvent::TokenCleared);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// 规范化后的 API 地址，未配置时为空串
    pub fn get_api_base(&self) -> String {
        self.storage.get(&self.api_base_key).unwrap_or_default()
    }

    /// 规范化并保存 API 地址
    ///
    /// # 返回
    /// 实际保存的值
    pub fn set_api_base(&self, value: &str) -> String {
        let base = normalize_api_base(value);
        if base.is_empty() {
            self.storage.delete(&self.api_base_key);
        } else if !self.storage.set(&self.api_base_key, &base) {
            crate::log_warn!("[Session] API base could not be persisted");
        }
        self.notify(&SessionEvent::ApiBaseChanged(base.clone()));
        base
    }

    /// 注册监听器，接收令牌和 API 地址的每次变更
    pub fn watch<F>(&self, listener: F)
    where
        F: Fn(&SessionEvent) + 'static,
    {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn notify(&self, event: &SessionEvent) {
        // 监听器可能回调本存储
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("api_base", &self.get_api_base())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// 规范化用户输入的 API 地址
///
/// 去除空白和结尾的斜杠；缺少协议时，本地主机补 `http://`，其他补 `https://`。
///
/// # 示例
/// - `localhost:8000` -> `http://localhost:8000`
/// - `api.example.com/` -> `https://api.example.com`
pub fn normalize_api_base(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.contains("://") {
        return trimmed.to_string();
    }
    let authority = trimmed.split(['/', '?', '#']).next().unwrap_or(trimmed);
    let scheme = if is_local_host(host_of(authority)) {
        "http"
    } else {
        "https"
    };
    format!("{}://{}", scheme, trimmed)
}

fn host_of(authority: &str) -> &str {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }
    if authority.matches(':').count() > 1 {
        // 裸 IPv6 地址
        return authority;
    }
    authority.split(':').next().unwrap_or(authority)
}

fn is_local_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "localhost"
        || host.ends_with(".localhost")
        || host.starts_with("127.")
        || host == "0.0.0.0"
        || host == "[::1]"
        || host == "::1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn store_with(memory: &MemoryStore) -> SessionStore {
        SessionStore::new(Rc::new(memory.clone()), &ClientConfig::default())
    }

    #[test]
    fn test_normalize_api_base() {
        assert_eq!(normalize_api_base("  http://localhost:8000/ "), "http://localhost:8000");
        assert_eq!(normalize_api_base("localhost:8000//"), "http://localhost:8000");
        assert_eq!(normalize_api_base("127.0.0.1:8000"), "http://127.0.0.1:8000");
        assert_eq!(normalize_api_base("[::1]:8000/api/"), "http://[::1]:8000/api");
        assert_eq!(normalize_api_base("api.example.com"), "https://api.example.com");
        assert_eq!(normalize_api_base("erp.example.com:8443/v1"), "https://erp.example.com:8443/v1");
        assert_eq!(normalize_api_base("https://erp.example.com///"), "https://erp.example.com");
        assert_eq!(normalize_api_base("   "), "");
        assert_eq!(normalize_api_base("///"), "");
    }

    #[test]
    fn test_default_api_base_is_seeded_once() {
        let memory = MemoryStore::new();
        let store = store_with(&memory);
        assert_eq!(store.get_api_base(), "http://localhost:8000");

        store.set_api_base("erp.example.com/");
        let reopened = store_with(&memory);
        assert_eq!(reopened.get_api_base(), "https://erp.example.com");
    }

    #[test]
    fn test_blank_api_base_clears_it() {
        let store = store_with(&MemoryStore::new());
        assert_eq!(store.set_api_base("  "), "");
        assert_eq!(store.get_api_base(), "");
    }

    #[test]
    fn test_token_lifecycle_persists_across_instances() {
        let memory = MemoryStore::new();
        let store = store_with(&memory);
        assert!(!store.is_authenticated());

        store.set_token("  abc123 ");
        assert_eq!(store.get_token().as_deref(), Some("abc123"));
        assert!(store_with(&memory).is_authenticated());

        store.clear_token();
        assert_eq!(store.get_token(), None);
        assert!(!store_with(&memory).is_authenticated());
    }

    #[test]
    fn test_blank_token_clears_session() {
        let store = store_with(&MemoryStore::new());
        store.set_token("abc");
        store.set_token("   ");
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_watchers_see_changes() {
        let store = store_with(&MemoryStore::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        store.watch(move |e| sink.borrow_mut().push(e.clone()));

        store.set_token("t");
        store.clear_token();
        // 令牌已不存在：不再通知
        store.clear_token();
        store.set_api_base("localhost:9000");

        assert_eq!(
            *events.borrow(),
            vec![
                SessionEvent::TokenSet,
                SessionEvent::TokenCleared,
                SessionEvent::ApiBaseChanged("http://localhost:9000".into()),
            ]
        );
    }

    #[test]
    fn test_listener_may_reenter_store() {
        let store = store_with(&MemoryStore::new());
        let seen = Rc::new(Cell::new(false));
        let observer = store.clone();
        let flag = seen.clone();
        store.watch(move |_| flag.set(observer.is_authenticated()));
        store.set_token("t");
        assert!(seen.get());
    }
}
