//! Axum route handlers for resume intake and document output.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::models::resume::ResumeData;
use crate::resume::parser::parse_resume_text;
use crate::resume::upload::{extract_upload_text, DOCX, PDF, PLAIN_TEXT};
use crate::resume::validation::{validate_resume, ValidationReport};
use crate::resume::DocumentTarget;
use crate::state::AppState;
use crate::tailoring::tailor::analyze_master_resume;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResumeResponse {
    pub resume: ResumeData,
    pub validation: ValidationReport,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume: ResumeData,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub resume: ResumeData,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub job_title: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/resumes/parse
///
/// Multipart upload with a `file` field (PDF, DOCX or plain text). Returns the
/// parsed resume together with its validation report; an incomplete parse is
/// not an error.
pub async fn handle_parse_upload(
    mut multipart: Multipart,
) -> Result<Json<ParseResumeResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = upload_content_type(field.content_type(), field.file_name());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        let upload = data.clone();
        let upload_type = content_type.clone();
        let text = run_blocking("upload text extraction", move || {
            extract_upload_text(&upload, &upload_type)
        })
        .await??;
        let resume = parse_resume_text(&text);
        let validation = validate_resume(&resume);
        info!(
            "Parsed {content_type} upload ({} bytes): valid={}",
            data.len(),
            validation.is_valid
        );

        return Ok(Json(ParseResumeResponse { resume, validation }));
    }

    Err(AppError::Validation("Multipart field 'file' is required".to_string()))
}

/// The declared content type, or one guessed from the file extension when the
/// client sent none (or a generic octet-stream).
fn upload_content_type(declared: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(declared) = declared.filter(|ct| !ct.is_empty() && *ct != "application/octet-stream") {
        return declared.to_string();
    }

    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase());
    match extension.as_deref() {
        Some("pdf") => PDF.to_string(),
        Some("docx") => DOCX.to_string(),
        Some("txt") => PLAIN_TEXT.to_string(),
        _ => declared.unwrap_or("application/octet-stream").to_string(),
    }
}

/// Runs CPU-bound document work off the async executor. A panic inside `work`
/// (pdf-extract panics on some malformed files) becomes an internal error.
async fn run_blocking<T, F>(what: &str, work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {what}: {e}")))
}

/// POST /api/resumes/validate
pub async fn handle_validate(ApiJson(resume): ApiJson<ResumeData>) -> Json<ValidationReport> {
    Json(validate_resume(&resume))
}

/// POST /api/resumes/analyze
///
/// Short free-text profile analysis from the language model.
pub async fn handle_analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis = analyze_master_resume(state.llm.as_ref(), &request.resume).await?;
    Ok(Json(AnalyzeResponse { analysis }))
}

/// POST /api/resumes/document
///
/// Renders the resume and returns it as a file download.
pub async fn handle_document(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DocumentRequest>,
) -> Result<Response, AppError> {
    let target = DocumentTarget {
        company: request.company,
        job_title: request.job_title,
    };

    let file_name = state.formatter.file_name(&target);
    let formatter = state.formatter.clone();
    let bytes = run_blocking("document rendering", move || {
        formatter.render(&request.resume, &target)
    })
    .await??;
    info!("Rendered {file_name} ({} bytes)", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, state.formatter.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
