//! Axum route handlers for keyword extraction, ATS scoring and tailoring.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiJson, AppError};
use crate::models::job::JobDescription;
use crate::models::resume::ResumeData;
use crate::models::score::AtsScore;
use crate::state::AppState;
use crate::tailoring::ats_scoring::{analyze_ats_compatibility, formatting_guidelines};
use crate::tailoring::jd_parser::extract_job_description;
use crate::tailoring::tailor::{extract_job_requirements, tailor, TailorOutcome};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractJobRequest {
    pub text: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StructureJobRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureJobResponse {
    pub job_description: JobDescription,
    /// True when the model reply could not be parsed and a default was used.
    pub placeholder: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub resume: ResumeData,
    pub job_description: JobDescription,
}

#[derive(Debug, Serialize)]
pub struct GuidelinesResponse {
    pub guidelines: Vec<&'static str>,
}

/// Either an inline master resume or the id of a user whose stored master
/// resume should be used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub master_resume: Option<ResumeData>,
    pub user_id: Option<String>,
    pub job_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/jobs/extract
///
/// Local keyword extraction. No model call.
pub async fn handle_extract_job(
    ApiJson(request): ApiJson<ExtractJobRequest>,
) -> Result<Json<JobDescription>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    Ok(Json(extract_job_description(
        &request.text,
        request.title.as_deref(),
        request.company.as_deref(),
        request.url.as_deref(),
    )))
}

/// POST /api/jobs/structure
///
/// Orchestrator step 1 on its own: structures posting text via the model.
pub async fn handle_structure_job(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StructureJobRequest>,
) -> Result<Json<StructureJobResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let step = extract_job_requirements(state.llm.as_ref(), &request.text).await?;

    Ok(Json(StructureJobResponse {
        job_description: step.value,
        placeholder: step.placeholder,
    }))
}

/// POST /api/ats/score
///
/// Heuristic ATS score of a resume against a structured job description.
pub async fn handle_ats_score(ApiJson(request): ApiJson<ScoreRequest>) -> Json<AtsScore> {
    Json(analyze_ats_compatibility(&request.resume, &request.job_description))
}

/// GET /api/ats/guidelines
pub async fn handle_ats_guidelines() -> Json<GuidelinesResponse> {
    Json(GuidelinesResponse {
        guidelines: formatting_guidelines(),
    })
}

/// POST /api/tailor
///
/// Full pipeline: validate → structure posting → rewrite → score.
pub async fn handle_tailor(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TailorRequest>,
) -> Result<Json<TailorOutcome>, AppError> {
    let master_resume = match (request.master_resume, request.user_id) {
        (Some(resume), _) => resume,
        (None, Some(user_id)) => {
            let user = state
                .store
                .get_user(&user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
            user.master_resume.ok_or_else(|| {
                AppError::Validation(format!("User {user_id} has no master resume"))
            })?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "masterResume or userId is required".to_string(),
            ))
        }
    };

    let outcome = tailor(
        state.llm.as_ref(),
        state.ats_scorer.as_ref(),
        &master_resume,
        &request.job_text,
    )
    .await?;

    Ok(Json(outcome))
}
