use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    domain::{AttachmentChange, CreateEventRequest, Event, UpdateEventRequest},
    error::Result,
    web::{
        admin::parse_path_id,
        redirect_with_error, redirect_with_success,
        templates::{BaseContext, FlashQuery, HtmlTemplate},
        uploads::{read_form, UploadKind},
        views::EventItem,
    },
};

#[derive(Template)]
#[template(path = "admin/event_form.html")]
pub struct EventFormTemplate {
    pub base: BaseContext,
    pub action: String,
    pub editing: bool,
    pub event: EventItem,
}

// GET /admin/events/new
pub async fn new_event_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(flash): Query<FlashQuery>,
) -> Response {
    HtmlTemplate(EventFormTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        action: "/admin/events".to_string(),
        editing: false,
        event: EventItem::default(),
    })
    .into_response()
}

// GET /admin/events/:id/edit
pub async fn edit_event_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let result = match parse_path_id(&id, "Event") {
        Ok(id) => state.service_context.event_store.find_by_id(id).await,
        Err(e) => Err(e),
    };
    let event = match result {
        Ok(event) => event,
        Err(e) => return redirect_with_error("/admin", &e),
    };

    HtmlTemplate(EventFormTemplate {
        base: BaseContext::load(&state, &jar, flash).await,
        action: format!("/admin/events/{}", event.id),
        editing: true,
        event: EventItem::from(&event),
    })
    .into_response()
}

// POST /admin/events
pub async fn create_event(State(state): State<AppState>, multipart: Multipart) -> Response {
    match try_create_event(&state, multipart).await {
        Ok(event) => redirect_with_success("/admin", &format!("Event \"{}\" created", event.title)),
        Err(e) => redirect_with_error("/admin/events/new", &e),
    }
}

async fn try_create_event(state: &AppState, multipart: Multipart) -> Result<Event> {
    let form = read_form(multipart, "image", UploadKind::Image, state.settings.uploads.max_file_bytes).await?;

    let draft = CreateEventRequest {
        title: form.text("title"),
        date: form.text("date"),
        end_date: form.optional("end_date"),
        venue: form.text("venue"),
        description: form.text("description"),
        link: form.optional("link"),
        featured: form.flag("featured"),
        active: form.flag("active"),
        category: form.optional("category"),
        image: form.upload,
    };

    state.service_context.event_store.create(draft).await
}

// POST /admin/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    match try_update_event(&state, &id, multipart).await {
        Ok(event) => redirect_with_success("/admin", &format!("Event \"{}\" updated", event.title)),
        Err(e) => redirect_with_error(&format!("/admin/events/{}/edit", id), &e),
    }
}

async fn try_update_event(state: &AppState, id: &str, multipart: Multipart) -> Result<Event> {
    let id = parse_path_id(id, "Event")?;
    let form = read_form(multipart, "image", UploadKind::Image, state.settings.uploads.max_file_bytes).await?;
    let remove_image = form.flag("remove_image");

    // The edit form always posts every field; absent checkboxes mean unchecked.
    let patch = UpdateEventRequest {
        title: form.optional("title"),
        date: form.optional("date"),
        end_date: Some(form.optional("end_date")),
        venue: form.optional("venue"),
        description: form.optional("description"),
        link: Some(form.optional("link")),
        featured: Some(form.flag("featured")),
        active: Some(form.flag("active")),
        category: form.optional("category"),
        image: AttachmentChange::from_form(form.upload, remove_image),
    };

    state.service_context.event_store.update(id, patch).await
}

// POST /admin/events/:id/delete
pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match parse_path_id(&id, "Event") {
        Ok(id) => state.service_context.event_store.delete(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => redirect_with_success("/admin", "Event deleted"),
        Err(e) => redirect_with_error("/admin", &e),
    }
}

async fn set_event_featured(state: &AppState, id: &str, featured: bool) -> Result<Event> {
    let id = parse_path_id(id, "Event")?;
    let patch = UpdateEventRequest {
        featured: Some(featured),
        ..Default::default()
    };
    state.service_context.event_store.update(id, patch).await
}

// POST /admin/events/:id/feature
pub async fn feature_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match set_event_featured(&state, &id, true).await {
        Ok(event) => redirect_with_success("/admin", &format!("Event \"{}\" featured", event.title)),
        Err(e) => redirect_with_error("/admin", &e),
    }
}

// POST /admin/events/:id/unfeature
pub async fn unfeature_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match set_event_featured(&state, &id, false).await {
        Ok(event) => redirect_with_success("/admin", &format!("Event \"{}\" unfeatured", event.title)),
        Err(e) => redirect_with_error("/admin", &e),
    }
}
