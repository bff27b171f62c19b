use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::state::AppState,
    auth::{AuthService, SESSION_COOKIE},
    web::{
        redirect_with_error,
        templates::{BaseContext, FlashQuery, HtmlTemplate},
    },
};

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub base: BaseContext,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub password: String,
}

// GET /admin/login
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let base = BaseContext::load(&state, &jar, flash).await;
    if base.is_authenticated {
        return Redirect::to("/admin").into_response();
    }
    HtmlTemplate(LoginTemplate { base }).into_response()
}

// POST /admin/login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth_service = &state.service_context.auth_service;

    match auth_service.login(&form.password).await {
        Ok((_session, token)) => {
            let secure = state.settings.server.base_url.starts_with("https://");
            let cookie = auth_service.create_session_cookie(&token, secure);
            (jar.add(cookie), Redirect::to("/admin")).into_response()
        }
        Err(crate::error::AppError::Unauthorized) => {
            Redirect::to("/admin/login?error=Invalid%20password").into_response()
        }
        Err(e) => redirect_with_error("/admin/login", &e),
    }
}

// POST /admin/logout
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await;
    }

    let jar = jar.add(AuthService::create_logout_cookie());
    (jar, Redirect::to("/")).into_response()
}
