//! 路由服务模块 - 核心引擎
//!
//! 所有对 window.location 的操作都集中在此模块。
//! 每次片段变化都走同一流程："解析（守卫） -> 显示页面 -> 投递闪现消息"。

use erp_client::navigation::{Landing, Navigator};
use erp_client::{log_info, log_warn};
use erp_shared::route::AppRoute;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use crate::api::notices;
use crate::auth::{self, AuthContext};

const APP_NAME: &str = "GenericERP";

fn location() -> Option<web_sys::Location> {
    web_sys::window().map(|w| w.location())
}

/// 获取当前 `#/...` 片段，没有时为空串
fn current_fragment() -> String {
    location()
        .and_then(|l| l.hash().ok())
        .unwrap_or_default()
}

/// 推送历史记录，浏览器随后触发 `hashchange`
fn set_hash(fragment: &str) {
    if let Some(location) = location() {
        if location.set_hash(fragment).is_err() {
            log_warn!("[Router] could not set fragment {}", fragment);
        }
    }
}

/// 替换当前历史记录（用于重定向）
fn replace_hash(fragment: &str) {
    if let Some(location) = location() {
        if location.replace(fragment).is_err() {
            log_warn!("[Router] could not replace fragment with {}", fragment);
        }
    }
}

fn set_document_title(title: &str) {
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        document.set_title(&format!("{} · {}", title, APP_NAME));
    }
}

/// 路由服务
///
/// 可复制的句柄，通过 Context 提供。
/// 导航的副作用在 [`Navigator`] 中；本服务只操作 `window.location` 和页面信号。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: RwSignal<AppRoute>,
    /// 当前页面显示的闪现消息
    notice: RwSignal<Option<String>>,
    navigator: StoredValue<Navigator, LocalStorage>,
    auth: AuthContext,
}

impl RouterService {
    fn new(auth: AuthContext) -> Self {
        Self {
            current_route: RwSignal::new(AppRoute::default()),
            notice: RwSignal::new(None),
            navigator: StoredValue::new_local(Navigator::new(auth.session(), notices())),
            auth,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route.read_only()
    }

    pub fn notice(&self) -> ReadSignal<Option<String>> {
        self.notice.read_only()
    }

    /// 不导航，直接在当前页面显示消息
    pub fn set_notice(&self, text: Option<String>) {
        self.notice.set(text);
    }

    /// 编程式导航
    ///
    /// # 参数
    /// - `route`: 目标路由；已在该路由时重新执行一遍流程
    pub fn navigate(&self, route: AppRoute) {
        let target = route.fragment();
        if current_fragment() == target {
            self.sync();
        } else {
            set_hash(&target);
        }
    }

    /// 令牌保存后调用：投递成功消息，并前往触发登录的路由（如有）
    pub fn complete_login(&self) {
        let target = self.navigator.with_value(|n| n.complete_login());
        self.navigate(target);
    }

    /// **核心方法：解析当前片段并应用结果**
    fn sync(&self) {
        let landing = self.navigator.with_value(|n| n.enter(&current_fragment()));

        if let Some(token) = landing.revoked_token.clone() {
            auth::revoke_token(&self.auth, token);
        }

        let redirected = landing.redirect.is_some();
        let route = landing.route;
        // 先显示落地页再替换片段，被请求的页面永远不会渲染
        self.show(landing);
        if redirected {
            replace_hash(&route.fragment());
        }
    }

    fn show(&self, landing: Landing) {
        let Landing { route, notice, .. } = landing;
        let changed = self.current_route.get_untracked() != route;
        self.current_route.set(route);
        set_document_title(route.meta().title);

        match notice {
            Some(text) => self.notice.set(Some(text)),
            None if changed => self.notice.set(None),
            None => {}
        }
    }

    /// 初始化 hashchange 监听（浏览器前进/后退和链接点击）
    fn init_hashchange_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || router.sync());

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        }

        // 监听器与页面同生命周期
        closure.forget();
    }

    /// 设置认证状态监听
    ///
    /// 会话失效（401 或在别处登出）时重新解析，受保护页面随之跳到登录页。
    fn setup_auth_redirect(&self) {
        let router = *self;
        let is_authenticated = self.auth.is_authenticated;

        Effect::new(move |prev: Option<bool>| {
            let is_auth = is_authenticated.get();
            if prev == Some(true) && !is_auth {
                log_info!("[Router] session ended, re-resolving route");
                router.sync();
            }
            is_auth
        });
    }
}

/// 提供路由服务到 Context，并解析初始片段
fn provide_router(auth: AuthContext) -> RouterService {
    let router = RouterService::new(auth);

    router.init_hashchange_listener();
    router.setup_auth_redirect();
    router.sync();

    provide_context(router);
    router
}

pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// 组件 (Components)
// ============================================================================

#[component]
pub fn Router(auth: AuthContext, children: Children) -> impl IntoView {
    provide_router(auth);

    children()
}

/// 渲染当前路由的页面
#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}
