use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    error::Result,
    repository::AttachmentData,
};

fn attachment_response(attachment: AttachmentData) -> Response {
    let filename = attachment.filename.replace(['"', '\\', '\r', '\n'], "");
    (
        [
            (header::CONTENT_TYPE, attachment.content_type),
            (header::CONTENT_LENGTH, attachment.data.len().to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", filename)),
        ],
        attachment.data,
    )
        .into_response()
}

// GET /messages/:id/file
pub async fn message_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let attachment = state.service_context.message_store.get_attachment(id).await?;
    Ok(attachment_response(attachment))
}

// GET /events/:id/image
pub async fn event_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let attachment = state.service_context.event_store.get_attachment(id).await?;
    Ok(attachment_response(attachment))
}

// GET /announcements/:id/image
pub async fn announcement_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let attachment = state.service_context.announcement_store.get_attachment(id).await?;
    Ok(attachment_response(attachment))
}
