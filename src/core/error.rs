use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Wire-level error message returned to callers
pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_NOT_CONFIGURED: &str = "Cloudinary not configured";
pub const MSG_FILE_NOT_FOUND: &str = "File not found";
pub const MSG_FILE_TOO_LARGE: &str = "File too large";
pub const MSG_UPLOAD_FAILED: &str = "Upload video failed";

/// Error body: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Upload video failed")]
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Carries the reason for server logs only; the body is always "Unauthorized"
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Media service is not configured")]
    ServiceMisconfigured,

    #[error("Payload too large")]
    PayloadTooLarge,

    /// Upstream (Cloudinary) or persistence failure; the detail is never sent to the client
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(ref reason) => {
                tracing::debug!("Rejected unauthenticated request: {}", reason);
                (StatusCode::UNAUTHORIZED, MSG_UNAUTHORIZED.to_string())
            }
            AppError::ServiceMisconfigured => {
                tracing::error!("Rejected upload: Cloudinary credentials are not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MSG_NOT_CONFIGURED.to_string(),
                )
            }
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, MSG_FILE_TOO_LARGE.to_string())
            }
            AppError::UploadFailed(ref detail) => {
                tracing::error!("Upload video failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MSG_UPLOAD_FAILED.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
