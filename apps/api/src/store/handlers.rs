//! Axum route handlers for users and saved applications.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::models::application::{
    check_percentages, ApplicationRecord, ApplicationStatus, NewApplication,
};
use crate::models::resume::ResumeData;
use crate::models::user::{NewUser, User};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/users
///
/// Creates the user (generating an id when none is given) or merges the
/// provided fields into an existing one.
pub async fn handle_save_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewUser>,
) -> Result<Json<User>, AppError> {
    let user = state.store.upsert_user(request).await?;
    Ok(Json(user))
}

/// GET /api/users/:id/resume
///
/// The user's master resume, or `null` when none has been saved yet.
pub async fn handle_get_user_resume(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Option<ResumeData>>, AppError> {
    let user = state
        .store
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Ok(Json(user.master_resume))
}

/// POST /api/users/:id/resume
pub async fn handle_save_user_resume(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(resume): ApiJson<ResumeData>,
) -> Result<Json<User>, AppError> {
    let user = state.store.save_master_resume(&user_id, resume).await?;
    info!("Master resume saved for {user_id}");
    Ok(Json(user))
}

// ────────────────────────────────────────────────────────────────────────────
// Applications
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/applications
pub async fn handle_save_application(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewApplication>,
) -> Result<(StatusCode, Json<ApplicationRecord>), AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }
    check_percentages(request.ats_score, request.match_percentage).map_err(AppError::Validation)?;

    let record = state.store.save(request).await?;
    info!(
        "Application {} saved for {} ({} at {})",
        record.id, record.user_id, record.job_title, record.company
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/applications?userId=
///
/// Application history for one user, oldest first.
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationRecord>>, AppError> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userId query parameter is required".to_string()))?;

    let applications = state.store.list_by_user(&user_id).await?;
    Ok(Json(applications))
}

/// PATCH /api/applications/:id
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    ApiJson(request): ApiJson<StatusUpdate>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let status: ApplicationStatus = request
        .status
        .ok_or_else(|| AppError::Validation("status is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;

    let record = state.store.update_status(&application_id, status).await?;
    info!("Application {application_id} moved to {}", status.as_str());

    Ok(Json(record))
}
