//! Request/response dispatch for extension messages.
//!
//! Each message is handled against one installation's slots. Tailoring goes
//! through the same orchestrator the web routes use.

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::errors::AppError;
use crate::extension::job_page::{extract_job_from_html, is_job_site};
use crate::extension::messages::{ExtensionRequest, ExtensionResponse};
use crate::models::application::{check_percentages, ApplicationStatus, NewApplication};
use crate::models::job::JobDescription;
use crate::models::resume::ResumeData;
use crate::slots::SlotKey;
use crate::state::AppState;
use crate::store::new_user_id;
use crate::tailoring::tailor::{extract_job_requirements, tailor};

pub async fn dispatch(
    state: &AppState,
    install_id: &str,
    request: ExtensionRequest,
) -> Result<ExtensionResponse, AppError> {
    let slots = &state.slots;

    match request {
        ExtensionRequest::CaptureJobPage { html, text, url } => {
            slots.set(install_id, SlotKey::CurrentPageText, &text).await?;
            if let Some(url) = &url {
                slots.set(install_id, SlotKey::CurrentPageUrl, url).await?;
            }

            let job_data = html
                .as_deref()
                .and_then(|html| extract_job_from_html(html, url.as_deref()));
            if let Some(job) = &job_data {
                slots.set(install_id, SlotKey::CurrentJobData, job).await?;
                info!("Captured job page: '{}' at '{}'", job.title, job.company);
            }

            Ok(ExtensionResponse::JobPageCaptured { job_data })
        }

        ExtensionRequest::GetJobData => {
            let job_data = slots.get(install_id, SlotKey::CurrentJobData).await?;
            Ok(ExtensionResponse::JobData { job_data })
        }

        ExtensionRequest::ExtractJobData { text } => {
            if text.trim().is_empty() {
                return Err(AppError::Validation("text cannot be empty".to_string()));
            }
            let llm = state.llm_for_install(install_id).await?;
            let step = extract_job_requirements(llm.as_ref(), &text).await?;

            let mut job_description = step.value;
            job_description.url = slots.get(install_id, SlotKey::CurrentPageUrl).await?;
            slots
                .set(install_id, SlotKey::CurrentJobData, &job_description)
                .await?;

            Ok(ExtensionResponse::JobExtracted {
                job_description,
                placeholder: step.placeholder,
            })
        }

        ExtensionRequest::TailorResume { job_text } => {
            let master: ResumeData = slots
                .get(install_id, SlotKey::MasterResume)
                .await?
                .ok_or_else(no_master_resume)?;

            let job_text = match job_text.filter(|t| !t.trim().is_empty()) {
                Some(text) => text,
                None => cached_job_text(state, install_id).await?,
            };

            let llm = state.llm_for_install(install_id).await?;
            let outcome = tailor(llm.as_ref(), state.ats_scorer.as_ref(), &master, &job_text).await?;

            Ok(ExtensionResponse::ResumeTailored(outcome))
        }

        ExtensionRequest::SaveApplication {
            tailored_resume,
            ats_score,
            match_percentage,
            job_description,
        } => {
            check_percentages(ats_score, match_percentage).map_err(AppError::Validation)?;
            let user_id: String = slots
                .get(install_id, SlotKey::UserId)
                .await?
                .ok_or_else(|| {
                    AppError::Validation("No user is linked to this extension".to_string())
                })?;
            let original_resume: ResumeData = slots
                .get(install_id, SlotKey::MasterResume)
                .await?
                .ok_or_else(no_master_resume)?;
            let job_description = match job_description {
                Some(job) => job,
                None => slots
                    .get::<JobDescription>(install_id, SlotKey::CurrentJobData)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation("No job description captured".to_string())
                    })?,
            };

            let application = state
                .store
                .save(NewApplication {
                    user_id,
                    job_title: job_description.title.clone(),
                    company: job_description.company.clone(),
                    job_url: job_description.url.clone(),
                    job_description,
                    original_resume,
                    tailored_resume,
                    ats_score,
                    match_percentage,
                    applied_date: None,
                    status: ApplicationStatus::Applied,
                })
                .await?;

            Ok(ExtensionResponse::ApplicationSaved { application })
        }

        ExtensionRequest::GetUserResume => {
            let resume = slots.get(install_id, SlotKey::MasterResume).await?;
            Ok(ExtensionResponse::UserResume { resume })
        }

        ExtensionRequest::SetUserResume { user_id, resume } => {
            let user_id = match user_id.filter(|id| !id.trim().is_empty()) {
                Some(id) => id,
                None => slots
                    .get::<String>(install_id, SlotKey::UserId)
                    .await?
                    .unwrap_or_else(new_user_id),
            };

            slots.set(install_id, SlotKey::UserId, &user_id).await?;
            slots.set(install_id, SlotKey::MasterResume, &resume).await?;
            state.store.save_master_resume(&user_id, resume).await?;

            let last_sync = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            slots.set(install_id, SlotKey::LastSync, &last_sync).await?;
            info!("Master resume synced for {user_id}");

            Ok(ExtensionResponse::UserResumeSaved { user_id, last_sync })
        }

        ExtensionRequest::StoreCredentials {
            auth_token,
            gemini_api_key,
        } => {
            // an empty string clears the stored value
            for (slot, value) in [
                (SlotKey::AuthToken, auth_token),
                (SlotKey::GeminiApiKey, gemini_api_key),
            ] {
                match value {
                    Some(v) if v.trim().is_empty() => slots.remove(install_id, slot).await?,
                    Some(v) => slots.set(install_id, slot, &v).await?,
                    None => {}
                }
            }
            Ok(ExtensionResponse::CredentialsStored)
        }

        ExtensionRequest::CheckJobSite { url } => Ok(ExtensionResponse::JobSiteChecked {
            is_job_site: is_job_site(&url),
        }),

        ExtensionRequest::ClearStorage => {
            slots.clear(install_id).await?;
            info!("Cleared extension storage for {install_id}");
            Ok(ExtensionResponse::StorageCleared)
        }
    }
}

fn no_master_resume() -> AppError {
    AppError::Validation("No master resume stored; upload one first".to_string())
}

/// Description of the captured job, falling back to the raw page text.
async fn cached_job_text(state: &AppState, install_id: &str) -> Result<String, AppError> {
    let job: Option<JobDescription> = state.slots.get(install_id, SlotKey::CurrentJobData).await?;
    if let Some(job) = job.filter(|j| !j.description.trim().is_empty()) {
        return Ok(job.description);
    }

    let page_text: Option<String> = state.slots.get(install_id, SlotKey::CurrentPageText).await?;
    page_text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No job posting captured".to_string()))
}
