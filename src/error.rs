use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("File too large (max {} MB)", .limit / (1024 * 1024))]
    AttachmentTooLarge { limit: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    #[error("No attachment")]
    NoAttachment,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors the user can act on, as opposed to server faults.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::BadRequest(_)
                | AppError::AttachmentTooLarge { .. }
                | AppError::UnsupportedMediaType(_)
                | AppError::NotFound(_)
        )
    }
}

impl AppError {
    /// Text safe to show on an admin page.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::UnsupportedMediaType(msg) => msg.clone(),
            AppError::AttachmentTooLarge { .. } | AppError::NoAttachment => self.to_string(),
            AppError::Unauthorized => "Please log in again".to_string(),
            AppError::Database(_) | AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred".to_string())
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::AttachmentTooLarge { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UnsupportedMediaType(ref msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone())
            }
            AppError::NoAttachment => (StatusCode::NOT_FOUND, "No attachment".to_string()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
