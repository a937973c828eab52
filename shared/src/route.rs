//! 路由表与解析
//!
//! 纯领域层：不依赖 DOM 或 `web_sys`。
//! 浏览器路由把当前 URL 片段交给 [`resolve`]，再应用得到的 [`Resolution`]。

use std::fmt::Display;

/// 路由的静态元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: &'static str,
    pub description: &'static str,
    /// 仅在已认证时可访问
    pub requires_auth: bool,
    /// 登录及找回账号页面
    pub is_auth_page: bool,
    /// 页面带有闪现消息区域
    pub shows_notices: bool,
}

/// 应用路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    Config,
    /// 默认路由
    #[default]
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Products,
    Categories,
    Stock,
    Statement,
    Quotes,
    /// 伪路由：清除会话后落到登录页，从不渲染
    Logout,
}

impl AppRoute {
    pub const ALL: [AppRoute; 11] = [
        AppRoute::Config,
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::ForgotPassword,
        AppRoute::ResetPassword,
        AppRoute::Products,
        AppRoute::Categories,
        AppRoute::Stock,
        AppRoute::Statement,
        AppRoute::Quotes,
        AppRoute::Logout,
    ];

    /// `#/<name>` 片段中的名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Login => "login",
            Self::Register => "register",
            Self::ForgotPassword => "forgot-password",
            Self::ResetPassword => "reset-password",
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Stock => "stock",
            Self::Statement => "statement",
            Self::Quotes => "quotes",
            Self::Logout => "logout",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    pub fn meta(&self) -> RouteMeta {
        let (title, description) = match self {
            Self::Config => ("Configuração", "Defina a URL da API e verifique a conexão."),
            Self::Login => ("Entrar", "Acesse sua conta para gerenciar o estoque."),
            Self::Register => ("Criar conta", "Cadastre um e-mail e uma senha."),
            Self::ForgotPassword => (
                "Esqueci minha senha",
                "Receba por e-mail um código de 6 números.",
            ),
            Self::ResetPassword => ("Redefinir senha", "Use o código recebido para trocar a senha."),
            Self::Products => ("Produtos", "Cadastre e consulte produtos."),
            Self::Categories => ("Categorias", "Organize produtos e descontos padrão."),
            Self::Stock => ("Estoque", "Registre movimentações e acompanhe saldos."),
            Self::Statement => ("Extrato", "Movimentações de um produto por período."),
            Self::Quotes => ("Orçamentos", "Crie e acompanhe orçamentos."),
            Self::Logout => ("Sair", "Encerrando a sessão."),
        };
        RouteMeta {
            title,
            description,
            requires_auth: matches!(
                self,
                Self::Products | Self::Categories | Self::Stock | Self::Statement | Self::Quotes
            ),
            is_auth_page: matches!(
                self,
                Self::Login | Self::Register | Self::ForgotPassword | Self::ResetPassword
            ),
            shows_notices: !matches!(self, Self::Logout),
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.meta().requires_auth
    }

    pub fn fragment(&self) -> String {
        format!("#/{}", self.name())
    }

    /// 未认证访问受保护路由时的去向
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 登录后没有待返回路由时的去向
    pub fn auth_success_redirect() -> Self {
        Self::Products
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fragment())
    }
}

/// 从 `#/<name>` 中提取路由名
///
/// 名称只能由小写 ASCII 字母和连字符组成。
///
/// # 返回
/// - `Some(&str)` 格式合法的名称（不保证路由存在）
/// - `None` 片段为空或格式不合法
pub fn parse_fragment(fragment: &str) -> Option<&str> {
    let name = fragment.strip_prefix('#').unwrap_or(fragment).strip_prefix('/')?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
        return None;
    }
    Some(name)
}

/// 落地路由与请求路由不同的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// 未认证时请求了受保护路由
    Guard { requested: AppRoute },
    /// 请求了登出伪路由
    Logout,
}

impl Redirect {
    /// 重定向目标页显示的提示文本
    pub fn flash_message(&self) -> String {
        match self {
            Redirect::Guard { requested } => {
                format!("Faça login para acessar {}.", requested.meta().title)
            }
            Redirect::Logout => "Você saiu da sua conta.".to_string(),
        }
    }
}

/// 片段解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// 最终可见的路由
    pub route: AppRoute,
    pub redirect: Option<Redirect>,
}

/// **核心函数：把 URL 片段映射为应显示的路由**
///
/// 未知或格式错误的片段回退到默认路由。
/// 未认证访问受保护路由、访问登出伪路由，都会落到登录页。
///
/// # 参数
/// - `fragment`: 当前 `location.hash`
/// - `is_authenticated`: 当前是否持有令牌
pub fn resolve(fragment: &str, is_authenticated: bool) -> Resolution {
    let candidate = parse_fragment(fragment)
        .and_then(AppRoute::from_name)
        .unwrap_or_default();

    if candidate == AppRoute::Logout {
        return Resolution {
            route: AppRoute::auth_failure_redirect(),
            redirect: Some(Redirect::Logout),
        };
    }

    if candidate.requires_auth() && !is_authenticated {
        return Resolution {
            route: AppRoute::auth_failure_redirect(),
            redirect: Some(Redirect::Guard {
                requested: candidate,
            }),
        };
    }

    Resolution {
        route: candidate,
        redirect: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_fragments() {
        for route in AppRoute::ALL {
            let fragment = route.fragment();
            assert_eq!(parse_fragment(&fragment), Some(route.name()));
            assert_eq!(AppRoute::from_name(route.name()), Some(route));
        }
    }

    #[test]
    fn test_parse_fragment_is_strict() {
        assert_eq!(parse_fragment("#/products"), Some("products"));
        assert_eq!(parse_fragment("/stock"), Some("stock"));
        assert_eq!(parse_fragment(""), None);
        assert_eq!(parse_fragment("#"), None);
        assert_eq!(parse_fragment("#/"), None);
        assert_eq!(parse_fragment("#products"), None);
        assert_eq!(parse_fragment("#/Products"), None);
        assert_eq!(parse_fragment("#/products/1"), None);
        assert_eq!(parse_fragment("#/stock2"), None);
    }

    #[test]
    fn test_unknown_fragment_falls_back_to_default() {
        let res = resolve("#/nope", false);
        assert_eq!(res.route, AppRoute::Login);
        assert_eq!(res.redirect, None);

        let res = resolve("garbage", true);
        assert_eq!(res.route, AppRoute::default());
    }

    #[test]
    fn test_guarded_route_without_session_redirects_to_login() {
        let res = resolve("#/products", false);
        assert_eq!(res.route, AppRoute::Login);
        assert_eq!(
            res.redirect,
            Some(Redirect::Guard {
                requested: AppRoute::Products
            })
        );
        assert!(res.redirect.unwrap().flash_message().contains("Produtos"));
    }

    #[test]
    fn test_guarded_route_with_session_is_shown() {
        let res = resolve("#/products", true);
        assert_eq!(res.route, AppRoute::Products);
        assert_eq!(res.redirect, None);
    }

    #[test]
    fn test_open_routes_ignore_session() {
        for fragment in ["#/config", "#/login", "#/register", "#/reset-password"] {
            let res = resolve(fragment, false);
            assert!(res.redirect.is_none(), "{fragment} should not redirect");
        }
    }

    #[test]
    fn test_logout_never_renders() {
        for auth in [true, false] {
            let res = resolve("#/logout", auth);
            assert_eq!(res.route, AppRoute::Login);
            assert_eq!(res.redirect, Some(Redirect::Logout));
        }
    }

    #[test]
    fn test_registry_flags() {
        assert!(AppRoute::Statement.requires_auth());
        assert!(!AppRoute::Config.requires_auth());
        assert!(AppRoute::ForgotPassword.meta().is_auth_page);
        assert!(!AppRoute::Products.meta().is_auth_page);
        assert!(!AppRoute::Logout.meta().shows_notices);
    }
}
