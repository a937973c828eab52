use erp_shared::route::AppRoute;
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::web::router::use_router;

/// 导航条目：所有真实页面，按注册顺序
fn nav_routes() -> impl Iterator<Item = AppRoute> {
    AppRoute::ALL.into_iter().filter(|r| *r != AppRoute::Logout)
}

/// 页面外壳
///
/// 显示当前路由的标题与描述、恰好一个激活项的导航栏，以及闪现消息区域。
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let router = use_router();
    let auth = use_auth();
    let current = router.current_route();
    let notice = router.notice();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-6xl mx-auto space-y-6">
                <header class="space-y-1">
                    <h1 class="text-3xl font-bold">{move || current.get().meta().title}</h1>
                    <p class="text-base-content/70">{move || current.get().meta().description}</p>
                    <p class="text-xs text-base-content/50">
                        "API: " {move || auth.api_base.get()}
                    </p>
                </header>

                <nav class="flex flex-wrap gap-2">
                    {nav_routes()
                        .map(|route| {
                            let class = move || {
                                if current.get() == route {
                                    "btn btn-sm btn-primary"
                                } else {
                                    "btn btn-sm btn-ghost"
                                }
                            };
                            view! {
                                <a href=route.fragment() class=class>
                                    {route.meta().title}
                                </a>
                            }
                        })
                        .collect_view()}
                    <Show when=move || auth.is_authenticated.get()>
                        <a href=AppRoute::Logout.fragment() class="btn btn-sm btn-outline">
                            {AppRoute::Logout.meta().title}
                        </a>
                    </Show>
                </nav>

                <Show when=move || notice.get().is_some()>
                    <div role="status" class="alert alert-info shadow">
                        <span>{move || notice.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <main class="card bg-base-100 shadow">
                    <div class="card-body space-y-4">{children()}</div>
                </main>
            </div>
        </div>
    }
}
