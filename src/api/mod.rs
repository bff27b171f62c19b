pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use tower_http::{
    compression::CompressionLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
    web,
};
use state::AppState;

/// Room for the text fields of a multipart form on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let body_limit = settings.uploads.max_file_bytes + FORM_OVERHEAD_BYTES;
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Health endpoint
        .route("/health", get(handlers::root::health_check))

        // JSON feeds
        .route("/messages-data", get(handlers::data::messages_data))
        .route("/events-data", get(handlers::data::events_data))
        .route("/announcements-data", get(handlers::data::announcements_data))

        // Attachment downloads
        .route("/messages/:id/file", get(handlers::attachments::message_file))
        .route("/events/:id/image", get(handlers::attachments::event_image))
        .route("/announcements/:id/image", get(handlers::attachments::announcement_image))

        // HTML pages and the admin panel
        .merge(web::create_web_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
