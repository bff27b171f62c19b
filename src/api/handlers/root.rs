use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::api::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let durable_store = state.service_context.using_durable_store().await;

    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "durable_store": durable_store,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
