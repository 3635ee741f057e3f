use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

/// Failures that end a request with an error status. Soft failures
/// (not logged in, not the owner, unknown recipe) are redirects instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("upload failed: {0}")]
    Upload(#[source] anyhow::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Upload(e) => {
                warn!(error = %e, "upload failed");
                (StatusCode::BAD_REQUEST, "Upload failed").into_response()
            }
            AppError::BadRequest(msg) => {
                warn!(%msg, "bad request");
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AppError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
