use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};

use crate::{
    api::state::AppState,
    domain::{
        parse_event_date, validation::non_blank, Announcement, AnnouncementKind,
        AttachmentChange, CreateAnnouncementRequest, UpdateAnnouncementRequest,
    },
    error::{AppError, Result},
    web::{
        admin::parse_path_id,
        redirect_with_error, redirect_with_success,
        templates::{BaseContext, FlashQuery, HtmlTemplate},
        uploads::{read_form, FormData, UploadKind},
        views::AnnouncementItem,
    },
};

#[derive(Template)]
#[template(path = "admin/announcement_form.html")]
pub struct AnnouncementFormTemplate {
    pub base: BaseContext,
    pub action: String,
    pub editing: bool,
    pub announcement: AnnouncementItem,
}

// GET /admin/announcements/new
pub async fn new_announcement_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(flash): Query<FlashQuery>,
) -> Response {
    HtmlTemplate(AnnouncementFormTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        action: "/admin/announcements".to_string(),
        editing: false,
        announcement: AnnouncementItem::default(),
    })
    .into_response()
}

// GET /admin/announcements/:id/edit
pub async fn edit_announcement_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let result = match parse_path_id(&id, "Announcement") {
        Ok(id) => state.service_context.announcement_store.find_by_id(id).await,
        Err(e) => Err(e),
    };
    let announcement = match result {
        Ok(announcement) => announcement,
        Err(e) => return redirect_with_error("/admin", &e),
    };

    HtmlTemplate(AnnouncementFormTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        action: format!("/admin/announcements/{}", announcement.id),
        editing: true,
        announcement: AnnouncementItem::from(&announcement),
    })
    .into_response()
}

/// The type select; blank means the default.
fn parse_kind(form: &FormData) -> Result<Option<AnnouncementKind>> {
    match non_blank(form.optional("type")) {
        None => Ok(None),
        Some(value) => AnnouncementKind::from_str(&value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid announcement type: {}", value))),
    }
}

/// `datetime-local` input, read as UTC. Blank means no expiry.
fn parse_expiry(form: &FormData) -> Result<Option<DateTime<Utc>>> {
    non_blank(form.optional("expires_at"))
        .map(|value| parse_event_date(&value).map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)))
        .transpose()
}

// POST /admin/announcements
pub async fn create_announcement(State(state): State<AppState>, multipart: Multipart) -> Response {
    match try_create_announcement(&state, multipart).await {
        Ok(announcement) => redirect_with_success(
            "/admin",
            &format!("Announcement \"{}\" created", announcement.title),
        ),
        Err(e) => redirect_with_error("/admin/announcements/new", &e),
    }
}

async fn try_create_announcement(state: &AppState, multipart: Multipart) -> Result<Announcement> {
    let form = read_form(multipart, "image", UploadKind::Image, state.settings.uploads.max_file_bytes).await?;

    let priority = form.number("priority")?;
    let kind = parse_kind(&form)?;
    let expires_at = parse_expiry(&form)?;
    let display_order = form.number("display_order")?;

    let draft = CreateAnnouncementRequest {
        title: form.text("title"),
        content: form.text("content"),
        priority,
        kind,
        background_color: form.optional("background_color"),
        text_color: form.optional("text_color"),
        featured: form.flag("featured"),
        active: form.flag("active"),
        expires_at,
        display_order,
        image: form.upload,
    };

    state.service_context.announcement_store.create(draft).await
}

// POST /admin/announcements/:id
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    match try_update_announcement(&state, &id, multipart).await {
        Ok(announcement) => redirect_with_success(
            "/admin",
            &format!("Announcement \"{}\" updated", announcement.title),
        ),
        Err(e) => redirect_with_error(&format!("/admin/announcements/{}/edit", id), &e),
    }
}

async fn try_update_announcement(
    state: &AppState,
    id: &str,
    multipart: Multipart,
) -> Result<Announcement> {
    let id = parse_path_id(id, "Announcement")?;
    let form = read_form(multipart, "image", UploadKind::Image, state.settings.uploads.max_file_bytes).await?;

    let priority = form.number("priority")?;
    let kind = parse_kind(&form)?;
    let expires_at = parse_expiry(&form)?;
    let display_order = form.number("display_order")?;
    let remove_image = form.flag("remove_image");

    let patch = UpdateAnnouncementRequest {
        title: form.optional("title"),
        content: form.optional("content"),
        priority,
        kind,
        background_color: form.optional("background_color"),
        text_color: form.optional("text_color"),
        featured: Some(form.flag("featured")),
        active: Some(form.flag("active")),
        expires_at: Some(expires_at),
        display_order,
        image: AttachmentChange::from_form(form.upload, remove_image),
    };

    state.service_context.announcement_store.update(id, patch).await
}

// POST /admin/announcements/:id/delete
pub async fn delete_announcement(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match parse_path_id(&id, "Announcement") {
        Ok(id) => state.service_context.announcement_store.delete(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => redirect_with_success("/admin", "Announcement deleted"),
        Err(e) => redirect_with_error("/admin", &e),
    }
}

async fn set_announcement_featured(state: &AppState, id: &str, featured: bool) -> Result<Announcement> {
    let id = parse_path_id(id, "Announcement")?;
    let patch = UpdateAnnouncementRequest {
        featured: Some(featured),
        ..Default::default()
    };
    state.service_context.announcement_store.update(id, patch).await
}

// POST /admin/announcements/:id/feature
pub async fn feature_announcement(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match set_announcement_featured(&state, &id, true).await {
        Ok(a) => redirect_with_success("/admin", &format!("Announcement \"{}\" featured", a.title)),
        Err(e) => redirect_with_error("/admin", &e),
    }
}

// POST /admin/announcements/:id/unfeature
pub async fn unfeature_announcement(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match set_announcement_featured(&state, &id, false).await {
        Ok(a) => redirect_with_success("/admin", &format!("Announcement \"{}\" unfeatured", a.title)),
        Err(e) => redirect_with_error("/admin", &e),
    }
}
