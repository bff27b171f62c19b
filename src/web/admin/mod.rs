pub mod announcements;
pub mod events;
pub mod messages;

use askama::Template;
use axum::{
    Extension, Router,
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentSession, state::AppState},
    domain::Sort,
    error::{AppError, Result},
    web::{
        templates::{BaseContext, FlashQuery, HtmlTemplate},
        views::{AnnouncementItem, EventItem, MessageItem},
    },
};

pub fn create_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        // Messages
        .route("/messages", post(messages::create_message))
        .route("/messages/new", get(messages::new_message_page))
        .route("/messages/:id", post(messages::update_message))
        .route("/messages/:id/edit", get(messages::edit_message_page))
        .route("/messages/:id/delete", post(messages::delete_message))
        .route("/messages/:id/feature", post(messages::feature_message))
        .route("/messages/:id/unfeature", post(messages::unfeature_message))
        // Events
        .route("/events", post(events::create_event))
        .route("/events/new", get(events::new_event_page))
        .route("/events/:id", post(events::update_event))
        .route("/events/:id/edit", get(events::edit_event_page))
        .route("/events/:id/delete", post(events::delete_event))
        .route("/events/:id/feature", post(events::feature_event))
        .route("/events/:id/unfeature", post(events::unfeature_event))
        // Announcements
        .route("/announcements", post(announcements::create_announcement))
        .route("/announcements/new", get(announcements::new_announcement_page))
        .route("/announcements/:id", post(announcements::update_announcement))
        .route("/announcements/:id/edit", get(announcements::edit_announcement_page))
        .route("/announcements/:id/delete", post(announcements::delete_announcement))
        .route("/announcements/:id/feature", post(announcements::feature_announcement))
        .route("/announcements/:id/unfeature", post(announcements::unfeature_announcement))
        // Redirect to /admin/login when there is no session
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::api::middleware::auth::require_admin,
        ))
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub base: BaseContext,
    pub signed_in_at: String,
    pub messages: Vec<MessageItem>,
    pub events: Vec<EventItem>,
    pub announcements: Vec<AnnouncementItem>,
}

// GET /admin
pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(current): Extension<CurrentSession>,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let ctx = &state.service_context;

    let messages = ctx.message_store.find_all(Sort::Default).await?;
    let events = ctx.event_store.find_all(Sort::Default).await?;
    let announcements = ctx.announcement_store.find_all(Sort::Default).await?;

    Ok(HtmlTemplate(DashboardTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        signed_in_at: current.session.created_at.format("%b %-d, %Y %H:%M UTC").to_string(),
        messages: messages.iter().map(MessageItem::from).collect(),
        events: events.iter().map(EventItem::from).collect(),
        announcements: announcements.iter().map(AnnouncementItem::from).collect(),
    })
    .into_response())
}

/// Path ids arrive as text so a malformed one can be reported on the page
/// rather than as a bare 400.
pub(crate) fn parse_path_id(raw: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", kind)))
}
