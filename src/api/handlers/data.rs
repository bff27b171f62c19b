use axum::{extract::State, Json};
use chrono::Local;

use crate::{
    api::state::AppState,
    domain::{Announcement, EventView, Message, Sort},
    error::Result,
};

// GET /messages-data
pub async fn messages_data(State(state): State<AppState>) -> Result<Json<Vec<Message>>> {
    let messages = state.service_context.message_store.find_all(Sort::Default).await?;
    Ok(Json(messages))
}

// GET /events-data
pub async fn events_data(State(state): State<AppState>) -> Result<Json<Vec<EventView>>> {
    let now = Local::now().naive_local();
    let events = state.service_context.event_store.find_all(Sort::Default).await?;
    Ok(Json(events.into_iter().map(|e| EventView::at(e, now)).collect()))
}

// GET /announcements-data
pub async fn announcements_data(State(state): State<AppState>) -> Result<Json<Vec<Announcement>>> {
    let announcements = state.service_context.announcement_store.find_all(Sort::Default).await?;
    Ok(Json(announcements))
}
