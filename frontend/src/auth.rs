//! 认证模块
//!
//! 令牌由 [`SessionStore`] 持有；本上下文把它镜像为信号，
//! 使路由和外壳能响应登录、登出和 401。

use std::rc::Rc;

use erp_client::{ApiResult, RequestOptions, SessionEvent, SessionStore, log_info, log_warn};
use erp_shared::{BEARER_PREFIX, HEADER_AUTHORIZATION};
use erp_shared::protocol::{ApiRequest, LoginRequest, LogoutRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{api_client, config};
use crate::web::WebStorage;

/// 认证上下文 - 通过 Context 共享
#[derive(Clone, Copy)]
pub struct AuthContext {
    session: StoredValue<SessionStore, LocalStorage>,
    /// 镜像 `SessionStore::is_authenticated`
    pub is_authenticated: RwSignal<bool>,
    /// 镜像 `SessionStore::get_api_base`
    pub api_base: RwSignal<String>,
}

impl AuthContext {
    /// 打开持久化会话，并让信号订阅它的变更
    pub fn new() -> Self {
        let session = SessionStore::new(Rc::new(WebStorage::Local), &config());
        let is_authenticated = RwSignal::new(session.is_authenticated());
        let api_base = RwSignal::new(session.get_api_base());

        session.watch(move |event| match event {
            SessionEvent::TokenSet => is_authenticated.set(true),
            SessionEvent::TokenCleared => is_authenticated.set(false),
            SessionEvent::ApiBaseChanged(base) => api_base.set(base.clone()),
        });

        Self {
            session: StoredValue::new_local(session),
            is_authenticated,
            api_base,
        }
    }

    pub fn session(&self) -> SessionStore {
        self.session.get_value()
    }

    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        self.is_authenticated.into()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录：用凭证换取令牌并保存
///
/// # 参数
/// - `ctx`: 认证上下文
/// - `email`: 登录邮箱
/// - `password`: 密码
///
/// # 返回
/// - `Ok(())` 令牌已保存，`is_authenticated` 随之变为 `true`
/// - `Err(ApiError)` 登录失败，会话不变
pub async fn login(ctx: &AuthContext, email: String, password: String) -> ApiResult<()> {
    let api = api_client(ctx);
    let token = api.call(&LoginRequest { email, password }).await?;
    ctx.session().set_token(&token.access_token);
    Ok(())
}

/// 在服务端吊销已在本地清除的令牌
///
/// 后台执行，结果只记录日志。
///
/// # 参数
/// - `ctx`: 认证上下文（提供 API 地址）
/// - `token`: 要吊销的令牌，显式放入 `Authorization` 头
pub fn revoke_token(ctx: &AuthContext, token: String) {
    let api = api_client(ctx);
    spawn_local(async move {
        let options = RequestOptions::new(LogoutRequest::METHOD).with_header(
            HEADER_AUTHORIZATION,
            &format!("{}{}", BEARER_PREFIX, token),
        );
        match api.request(LogoutRequest::PATH, options).await {
            Ok(_) => log_info!("[Auth] token revoked"),
            Err(e) => log_warn!("[Auth] logout request failed: {}", e),
        }
    });
}
