use futures::future::LocalBoxFuture;
use std::time::Duration;

/// 一次性计时器
///
/// 返回的 future 在 `duration` 之后完成；提前丢弃时必须释放底层计时器。
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
