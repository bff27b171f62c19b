use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::{session::Session, SESSION_COOKIE},
};

/// The admin session behind the current request.
#[derive(Clone)]
pub struct CurrentSession {
    pub session: Session,
}

async fn current_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    let session_cookie = jar.get(SESSION_COOKIE)?;
    state
        .service_context
        .auth_service
        .validate_session(session_cookie.value())
        .await
}

pub async fn is_authenticated(state: &AppState, jar: &CookieJar) -> bool {
    current_session(state, jar).await.is_some()
}

/// Gate for the admin pages. Browsers without a valid session are sent to
/// the login form instead of getting a bare 401.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_session(&state, &jar).await {
        Some(session) => {
            request.extensions_mut().insert(CurrentSession { session });
            next.run(request).await
        }
        None => {
            tracing::debug!("No admin session for {}, redirecting to login", request.uri().path());
            Redirect::to("/admin/login").into_response()
        }
    }
}
