use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::render::error_page;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Multipart(e) => {
                let status = e.status();
                if status.is_server_error() {
                    tracing::error!("Multipart error: {e}");
                } else {
                    tracing::warn!("Rejected multipart body: {e}");
                }
                (status, "The submitted form could not be read.")
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "We could not save your submission. Please try again later.",
                )
            }
        };

        (status, Html(error_page(message))).into_response()
    }
}
