use std::rc::Rc;

use crate::config::ClientConfig;
use crate::session::KeyValueStore;

/// 单槽闪现消息，跨越一次导航传递
///
/// 浏览器中使用会话级存储：随标签页关闭而消失，与持久化的令牌无关。
#[derive(Clone)]
pub struct NoticeChannel {
    storage: Rc<dyn KeyValueStore>,
    key: String,
}

impl NoticeChannel {
    pub fn new(storage: Rc<dyn KeyValueStore>, config: &ClientConfig) -> Self {
        Self {
            storage,
            key: config.flash_key.clone(),
        }
    }

    /// 覆盖尚未消费的消息；空白文本被忽略
    pub fn post(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.storage.set(&self.key, text);
    }

    /// 取出并清除待显示的消息
    ///
    /// # 返回
    /// - `Some(String)` 有待显示的非空消息
    /// - `None` 没有消息
    pub fn consume(&self) -> Option<String> {
        let text = self.storage.get(&self.key)?;
        self.storage.delete(&self.key);
        Some(text).filter(|t| !t.is_empty())
    }

    pub fn is_pending(&self) -> bool {
        self.storage
            .get(&self.key)
            .is_some_and(|text| !text.is_empty())
    }
}
