pub mod admin;
pub mod pages;
pub mod templates;
pub mod uploads;
pub mod views;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use crate::{api::state::AppState, error::AppError};

pub fn create_web_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public pages
        .route("/", get(pages::home))
        .route("/messages", get(pages::messages_page))
        .route("/messages/search", get(pages::search_messages_page))
        .route("/events", get(pages::events_page))
        .route("/announcements", get(pages::announcements_page))

        // Admin login (outside the gate)
        .route("/admin/login", get(templates::auth::login_page))
        .route("/admin/login", post(templates::auth::login_handler))
        .route("/admin/logout", post(templates::auth::logout_handler))

        .nest("/admin", admin::create_admin_routes(state))
}

/// Redirects to `path` with a success flash.
pub fn redirect_with_success(path: &str, message: &str) -> Response {
    Redirect::to(&flash_url(path, "success", message)).into_response()
}

/// Redirects to `path` with the error's user-facing text. Server faults are
/// logged here since the page only shows a generic message.
pub fn redirect_with_error(path: &str, err: &AppError) -> Response {
    if !err.is_user_facing() {
        tracing::error!("Admin request failed: {}", err);
    }
    Redirect::to(&flash_url(path, "error", &err.user_message())).into_response()
}

fn flash_url(path: &str, key: &str, message: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", path, separator, key, urlencoding::encode(message))
}
