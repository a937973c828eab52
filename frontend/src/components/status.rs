use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;

/// 页面区块上一次操作的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Busy,
    Ok(String),
    Err(String),
}

impl Status {
    pub fn is_busy(&self) -> bool {
        matches!(self, Status::Busy)
    }
}

/// 后台执行任务，并把结果写入状态
///
/// # 参数
/// - `status`: 执行期间为 `Busy`，结束后为 `Ok` 或 `Err`
/// - `task`: 返回成功或失败文本的 future
pub fn track<F>(status: RwSignal<Status>, task: F)
where
    F: Future<Output = Result<String, String>> + 'static,
{
    status.set(Status::Busy);
    spawn_local(async move {
        match task.await {
            Ok(text) => status.set(Status::Ok(text)),
            Err(text) => status.set(Status::Err(text)),
        }
    });
}

/// 显示在操作旁边的纯文本状态
#[component]
pub fn StatusLine(status: RwSignal<Status>) -> impl IntoView {
    move || match status.get() {
        Status::Idle => ().into_any(),
        Status::Busy => view! { <p class="text-sm text-base-content/60">"Carregando..."</p> }.into_any(),
        Status::Ok(text) => view! { <p class="text-sm text-success">{text}</p> }.into_any(),
        Status::Err(text) => view! { <p class="text-sm text-error" role="alert">{text}</p> }.into_any(),
    }
}
