use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    domain::{AttachmentChange, CreateMessageRequest, Message, UpdateMessageRequest},
    error::Result,
    web::{
        admin::parse_path_id,
        redirect_with_error, redirect_with_success,
        templates::{BaseContext, FlashQuery, HtmlTemplate},
        uploads::{read_form, UploadKind},
        views::MessageItem,
    },
};

#[derive(Template)]
#[template(path = "admin/message_form.html")]
pub struct MessageFormTemplate {
    pub base: BaseContext,
    pub action: String,
    pub editing: bool,
    pub message: MessageItem,
}

// GET /admin/messages/new
pub async fn new_message_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(flash): Query<FlashQuery>,
) -> Response {
    HtmlTemplate(MessageFormTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        action: "/admin/messages".to_string(),
        editing: false,
        message: MessageItem::default(),
    })
    .into_response()
}

// GET /admin/messages/:id/edit
pub async fn edit_message_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let message = match find_message(&state, &id).await {
        Ok(message) => message,
        Err(e) => return redirect_with_error("/admin", &e),
    };

    HtmlTemplate(MessageFormTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        action: format!("/admin/messages/{}", message.id),
        editing: true,
        message: MessageItem::from(&message),
    })
    .into_response()
}

async fn find_message(state: &AppState, id: &str) -> Result<Message> {
    let id = parse_path_id(id, "Message")?;
    state.service_context.message_store.find_by_id(id).await
}

// POST /admin/messages
pub async fn create_message(State(state): State<AppState>, multipart: Multipart) -> Response {
    match try_create_message(&state, multipart).await {
        Ok(message) => {
            redirect_with_success("/admin", &format!("Message \"{}\" created", message.title))
        }
        Err(e) => redirect_with_error("/admin/messages/new", &e),
    }
}

async fn try_create_message(state: &AppState, multipart: Multipart) -> Result<Message> {
    let form = read_form(multipart, "file", UploadKind::Pdf, state.settings.uploads.max_file_bytes).await?;

    let draft = CreateMessageRequest {
        title: form.text("title"),
        code: form.text("code"),
        date: form.text("date"),
        author: form.text("author"),
        description: form.text("description"),
        file: form.upload,
    };

    state.service_context.message_store.create(draft).await
}

// POST /admin/messages/:id
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    match try_update_message(&state, &id, multipart).await {
        Ok(message) => {
            redirect_with_success("/admin", &format!("Message \"{}\" updated", message.title))
        }
        Err(e) => redirect_with_error(&format!("/admin/messages/{}/edit", id), &e),
    }
}

async fn try_update_message(state: &AppState, id: &str, multipart: Multipart) -> Result<Message> {
    let id = parse_path_id(id, "Message")?;
    let form = read_form(multipart, "file", UploadKind::Pdf, state.settings.uploads.max_file_bytes).await?;
    let remove_file = form.flag("remove_file");

    let patch = UpdateMessageRequest {
        title: form.optional("title"),
        code: form.optional("code"),
        date: form.optional("date"),
        author: form.optional("author"),
        description: form.optional("description"),
        file: AttachmentChange::from_form(form.upload, remove_file),
    };

    state.service_context.message_store.update(id, patch).await
}

// POST /admin/messages/:id/delete
pub async fn delete_message(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match parse_path_id(&id, "Message") {
        Ok(id) => state.service_context.message_store.delete(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => redirect_with_success("/admin", "Message deleted"),
        Err(e) => redirect_with_error("/admin", &e),
    }
}

// POST /admin/messages/:id/feature
pub async fn feature_message(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match parse_path_id(&id, "Message") {
        Ok(id) => state.service_context.message_store.set_featured(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(message) => {
            redirect_with_success("/admin", &format!("\"{}\" is now the featured message", message.title))
        }
        Err(e) => redirect_with_error("/admin", &e),
    }
}

// POST /admin/messages/:id/unfeature
pub async fn unfeature_message(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match parse_path_id(&id, "Message") {
        Ok(id) => state.service_context.message_store.unfeature(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(message) => {
            redirect_with_success("/admin", &format!("\"{}\" is no longer featured", message.title))
        }
        Err(e) => redirect_with_error("/admin", &e),
    }
}
