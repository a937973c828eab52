//! 计时器模块
//!
//! 在 [`Timer`] 接缝后面提供 `setTimeout`。

use std::time::Duration;

use erp_client::Timer;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;

/// 一次性超时
///
/// 延迟结束后完成；提前丢弃时清除浏览器计时器。
struct Timeout {
    handle: Option<i32>,
    #[allow(dead_code)]
    closure: Closure<dyn FnMut()>,
    fired: oneshot::Receiver<()>,
}

impl Timeout {
    fn new(millis: u32) -> Self {
        let (tx, fired) = oneshot::channel();
        let mut tx = Some(tx);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.take() {
                let _ = tx.send(());
            }
        });

        let handle = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    i32::try_from(millis).unwrap_or(i32::MAX),
                )
                .ok()
        });
        if handle.is_none() {
            erp_client::log_error!("[Timer] setTimeout unavailable");
        }

        Self {
            handle,
            closure,
            fired,
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }
}

/// 浏览器计时器
#[derive(Debug, Clone, Copy, Default)]
pub struct WebTimer;

impl Timer for WebTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        let mut timeout = Timeout::new(millis);
        async move {
            // 未能注册的计时器不能触发超时
            if timeout.handle.is_none() {
                futures::future::pending::<()>().await;
            }
            let _ = (&mut timeout.fired).await;
            // 已触发，无需清除
            timeout.handle = None;
        }
        .boxed_local()
    }
}
