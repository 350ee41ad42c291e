//! Axum route handler for the extension channel.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::{ApiJson, AppError};
use crate::extension::channel::dispatch;
use crate::extension::messages::{ExtensionRequest, ExtensionResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionEnvelope {
    pub install_id: String,
    pub message: ExtensionRequest,
}

/// POST /api/extension/messages
///
/// One typed request in, one typed response out. `installId` scopes the
/// extension's persisted slots.
pub async fn handle_extension_message(
    State(state): State<AppState>,
    ApiJson(envelope): ApiJson<ExtensionEnvelope>,
) -> Result<Json<ExtensionResponse>, AppError> {
    if envelope.install_id.trim().is_empty() {
        return Err(AppError::Validation("installId is required".to_string()));
    }

    let response = dispatch(&state, &envelope.install_id, envelope.message).await?;
    Ok(Json(response))
}
