pub mod auth;

use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::api::{middleware::auth::is_authenticated, state::AppState};

// Base template data that all templates will have access to
#[derive(Debug, Clone)]
pub struct BaseContext {
    pub site_name: String,
    pub is_authenticated: bool,
    pub using_durable_store: bool,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// `?success=` / `?error=` flash text carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl BaseContext {
    pub async fn load(state: &AppState, jar: &CookieJar, flash: FlashQuery) -> Self {
        Self {
            site_name: state.settings.site.name.clone(),
            is_authenticated: is_authenticated(state, jar).await,
            using_durable_store: state.service_context.using_durable_store().await,
            success: flash.success.filter(|s| !s.is_empty()),
            error: flash.error.filter(|s| !s.is_empty()),
        }
    }
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            ).into_response(),
        }
    }
}
