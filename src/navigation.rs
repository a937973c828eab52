//! 导航副作用 - 与 DOM 无关
//!
//! 路由服务（浏览器侧）只负责读写 URL 片段和渲染页面；
//! 解析片段之后的所有状态变化都集中在 [`Navigator`] 中：
//! 守卫重定向时记住目标路由、登出时清除令牌、投递和消费闪现消息。
//! 因此这些行为可以在宿主机上用 `MemoryStore` 测试。

use std::cell::Cell;
use std::rc::Rc;

use erp_shared::route::{AppRoute, Redirect, parse_fragment, resolve};

use crate::notice::NoticeChannel;
use crate::session::SessionStore;
use crate::{log_info, log_warn};

/// 登录成功后投递的闪现消息
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login realizado com sucesso.";

/// 一次导航的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    /// 最终可见的路由
    pub route: AppRoute,
    /// 非空时，调用方需要用 `route` 的片段替换当前 URL
    pub redirect: Option<Redirect>,
    /// 新页面应显示的闪现消息（已被消费）
    pub notice: Option<String>,
    /// 登出时被清除的令牌，调用方可据此通知服务端吊销
    pub revoked_token: Option<String>,
}

/// 导航状态机
///
/// 克隆体共享同一个"登录后返回"槽位。
#[derive(Clone)]
pub struct Navigator {
    session: SessionStore,
    notices: NoticeChannel,
    return_to: Rc<Cell<Option<AppRoute>>>,
}

impl Navigator {
    pub fn new(session: SessionStore, notices: NoticeChannel) -> Self {
        Self {
            session,
            notices,
            return_to: Rc::new(Cell::new(None)),
        }
    }

    /// 登录后将要返回的受保护路由
    pub fn pending_return(&self) -> Option<AppRoute> {
        self.return_to.get()
    }

    /// **核心方法：进入一个 URL 片段**
    ///
    /// 流程：解析 -> 守卫 -> 副作用 -> 消费闪现消息
    ///
    /// # 参数
    /// - `fragment`: 当前 `location.hash`，例如 `#/products`
    ///
    /// # 返回
    /// 描述应显示页面的 [`Landing`]。受保护页面在未认证时永远不会出现在结果中。
    pub fn enter(&self, fragment: &str) -> Landing {
        let resolution = resolve(fragment, self.session.is_authenticated());
        let mut revoked_token = None;

        match resolution.redirect {
            Some(Redirect::Guard { requested }) => {
                log_info!("[Router] {} requires a session, redirecting to login", requested);
                self.return_to.set(Some(requested));
            }
            Some(Redirect::Logout) => {
                log_info!("[Router] logout requested");
                revoked_token = self.session.get_token();
                self.session.clear_token();
            }
            None => {
                // 只有显式访问登录页才会结束会话；空片段默认落到登录页时不会。
                if parse_fragment(fragment) == Some(AppRoute::Login.name()) {
                    self.session.clear_token();
                }
            }
        }

        if let Some(redirect) = &resolution.redirect {
            self.notices.post(&redirect.flash_message());
        }

        let notice = if resolution.route.meta().shows_notices {
            self.notices.consume()
        } else {
            None
        };

        Landing {
            route: resolution.route,
            redirect: resolution.redirect,
            notice,
            revoked_token,
        }
    }

    /// 令牌保存之后调用：投递成功消息，并返回应前往的路由
    ///
    /// # 返回
    /// 触发登录的受保护路由；没有时为 [`AppRoute::auth_success_redirect`]。
    pub fn complete_login(&self) -> AppRoute {
        if !self.session.is_authenticated() {
            log_warn!("[Router] login completed without a stored token");
        }
        let target = self
            .return_to
            .take()
            .unwrap_or_else(AppRoute::auth_success_redirect);
        self.notices.post(LOGIN_SUCCESS_MESSAGE);
        log_info!("[Router] login completed, continuing to {}", target);
        target
    }
}
