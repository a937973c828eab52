//! GenericERP 浏览器控制台
//!
//! 基于 Context 的结构：
//! - `web`: 运行时接缝的浏览器实现，以及 hash 路由
//! - `auth`: 镜像为信号的会话上下文
//! - `components`: 外壳、通用表格，以及每个路由一个页面

mod api;
mod auth;
mod components {
    pub mod account;
    pub mod categories;
    pub mod config;
    pub mod data_table;
    pub mod field;
    pub mod products;
    pub mod quote_detail;
    pub mod quotes;
    pub mod shell;
    pub mod statement;
    pub mod status;
    pub mod stock;
}

use crate::auth::AuthContext;
use crate::components::account::{ForgotPasswordPage, LoginPage, RegisterPage, ResetPasswordPage};
use crate::components::categories::CategoriesPage;
use crate::components::config::ConfigPage;
use crate::components::products::ProductsPage;
use crate::components::quotes::QuotesPage;
use crate::components::shell::Shell;
use crate::components::statement::StatementPage;
use crate::components::stock::StockPage;

use erp_shared::route::AppRoute;
use leptos::prelude::*;

// `erp-client` 接缝的浏览器端实现
pub(crate) mod web {
    mod http;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::FetchClient;
    pub use storage::WebStorage;
    pub use timer::WebTimer;
}

use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 返回对应的页面组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Config => view! { <ConfigPage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        AppRoute::ResetPassword => view! { <ResetPasswordPage /> }.into_any(),
        AppRoute::Products => view! { <ProductsPage /> }.into_any(),
        AppRoute::Categories => view! { <CategoriesPage /> }.into_any(),
        AppRoute::Stock => view! { <StockPage /> }.into_any(),
        AppRoute::Statement => view! { <StatementPage /> }.into_any(),
        AppRoute::Quotes => view! { <QuotesPage /> }.into_any(),
        // 在成为当前路由之前就已被解析为登录页
        AppRoute::Logout => ().into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 会话上下文（持久化的令牌与 API 地址）
    let auth = AuthContext::new();
    provide_context(auth);

    // 2. 路由器：守卫接到会话上
    view! {
        <Router auth=auth>
            <Shell>
                <RouterOutlet matcher=route_matcher />
            </Shell>
        </Router>
    }
}
