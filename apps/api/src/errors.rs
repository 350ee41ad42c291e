use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::resume::DocumentError;
use crate::slots::SlotError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Malformed model replies never reach this type: they are absorbed by the
/// orchestrator with placeholder values.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A transport-level failure talking to the language model or a store.
    /// Callers may retry; nothing retries automatically.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON request body whose rejections (syntax, missing fields, wrong content
/// type) surface as `AppError::Validation` instead of axum's plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ServiceUnavailable(_))
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::ServiceUnavailable(format!("language model: {e}"))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AppError::NotFound(what),
            other => AppError::ServiceUnavailable(format!("application store: {other}")),
        }
    }
}

impl From<SlotError> for AppError {
    fn from(e: SlotError) -> Self {
        AppError::ServiceUnavailable(format!("slot store: {e}"))
    }
}

impl From<DocumentError> for AppError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::UnsupportedContentType(ct) => AppError::UnsupportedMedia(ct),
            DocumentError::Empty => {
                AppError::Validation("No text could be extracted from the upload".to_string())
            }
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "An upstream service is unavailable, please try again".to_string(),
                )
            }
            AppError::UnsupportedMedia(content_type) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                format!("Cannot read files of type '{content_type}'"),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": retryable
            }
        }));

        (status, body).into_response()
    }
}
