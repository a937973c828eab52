//! 登录与账号找回页面

use erp_shared::protocol::{ForgotPasswordRequest, RegisterRequest, ResetPasswordRequest};
use erp_shared::route::AppRoute;
use leptos::prelude::*;

use crate::api::{api_client, error_text, notices};
use crate::auth::{login, use_auth};
use crate::components::field::Field;
use crate::components::status::{Status, StatusLine, track};
use crate::web::router::use_router;

const PASSWORD_RESET_MESSAGE: &str = "Senha redefinida. Entre com a nova senha.";

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (email, password) = (email.get_untracked(), password.get_untracked());
        if email.trim().is_empty() || password.is_empty() {
            status.set(Status::Err("Informe e-mail e senha.".to_string()));
            return;
        }
        track(status, async move {
            login(&auth, email.trim().to_string(), password)
                .await
                .map_err(|e| error_text("Falha no login", &e))?;
            router.complete_login();
            Ok(String::new())
        });
    };

    view! {
        <form class="space-y-3" on:submit=on_submit>
            <Field label="E-mail" value=email kind="email" placeholder="voce@empresa.com" />
            <Field label="Senha" value=password kind="password" />
            <div class="flex gap-2 items-center">
                <button class="btn btn-primary btn-sm" disabled=move || status.get().is_busy()>
                    "Entrar"
                </button>
                <a class="link text-sm" href=AppRoute::Register.fragment()>"Criar conta"</a>
                <a class="link text-sm" href=AppRoute::ForgotPassword.fragment()>
                    "Esqueci minha senha"
                </a>
            </div>
            <StatusLine status=status />
        </form>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = RegisterRequest {
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        let api = api_client(&auth);
        track(status, async move {
            let res = api
                .call(&req)
                .await
                .map_err(|e| error_text("Falha no cadastro", &e))?;
            let mut text = format!("Conta criada para {}.", res.user.email);
            if res.email_sent {
                text.push_str(" Enviamos um e-mail de boas-vindas.");
            }
            Ok(text)
        });
    };

    view! {
        <form class="space-y-3" on:submit=on_submit>
            <Field label="E-mail" value=email kind="email" />
            <Field label="Senha" value=password kind="password" />
            <div class="flex gap-2 items-center">
                <button class="btn btn-primary btn-sm" disabled=move || status.get().is_busy()>
                    "Cadastrar"
                </button>
                <a class="link text-sm" href=AppRoute::Login.fragment()>"Já tenho conta"</a>
            </div>
            <StatusLine status=status />
        </form>
    }
}

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let auth = use_auth();

    let email = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = ForgotPasswordRequest {
            email: email.get_untracked().trim().to_string(),
        };
        let api = api_client(&auth);
        track(status, async move {
            api.call(&req)
                .await
                .map_err(|e| error_text("Falha ao solicitar código", &e))?;
            Ok("Se o e-mail estiver cadastrado, enviamos um código de 6 números.".to_string())
        });
    };

    view! {
        <form class="space-y-3" on:submit=on_submit>
            <Field label="E-mail" value=email kind="email" />
            <div class="flex gap-2 items-center">
                <button class="btn btn-primary btn-sm" disabled=move || status.get().is_busy()>
                    "Enviar código"
                </button>
                <a class="link text-sm" href=AppRoute::ResetPassword.fragment()>"Já tenho o código"</a>
            </div>
            <StatusLine status=status />
        </form>
    }
}

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let email = RwSignal::new(String::new());
    let code = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let status = RwSignal::new(Status::Idle);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = ResetPasswordRequest {
            email: email.get_untracked().trim().to_string(),
            token: code.get_untracked().trim().to_string(),
            new_password: new_password.get_untracked(),
        };
        let api = api_client(&auth);
        track(status, async move {
            api.call(&req)
                .await
                .map_err(|e| error_text("Falha ao redefinir senha", &e))?;
            notices().post(PASSWORD_RESET_MESSAGE);
            router.navigate(AppRoute::Login);
            Ok(String::new())
        });
    };

    view! {
        <form class="space-y-3" on:submit=on_submit>
            <Field label="E-mail" value=email kind="email" />
            <Field label="Código" value=code placeholder="000000" />
            <Field label="Nova senha" value=new_password kind="password" />
            <button class="btn btn-primary btn-sm" disabled=move || status.get().is_busy()>
                "Redefinir"
            </button>
            <StatusLine status=status />
        </form>
    }
}
