//! Typed messages exchanged with the browser extension.
//!
//! Wire shape: `{"type": "SCREAMING_CASE", "data": {...}}`. Unit variants may
//! omit `data`.

use serde::{Deserialize, Serialize};

use crate::models::application::ApplicationRecord;
use crate::models::job::JobDescription;
use crate::models::resume::ResumeData;
use crate::tailoring::tailor::TailorOutcome;

#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ExtensionRequest {
    /// Content script captured the current page.
    CaptureJobPage {
        #[serde(default)]
        html: Option<String>,
        #[serde(default)]
        text: String,
        #[serde(default)]
        url: Option<String>,
    },
    /// Job data cached by the last capture.
    GetJobData,
    /// Structure posting text with the model (orchestrator step 1).
    ExtractJobData { text: String },
    /// Full tailoring of the stored master resume. Without `jobText` the
    /// cached job data or page text is used.
    TailorResume {
        #[serde(default)]
        job_text: Option<String>,
    },
    SaveApplication {
        tailored_resume: ResumeData,
        ats_score: u32,
        match_percentage: u32,
        #[serde(default)]
        job_description: Option<JobDescription>,
    },
    GetUserResume,
    SetUserResume {
        #[serde(default)]
        user_id: Option<String>,
        resume: ResumeData,
    },
    StoreCredentials {
        #[serde(default)]
        auth_token: Option<String>,
        #[serde(default)]
        gemini_api_key: Option<String>,
    },
    CheckJobSite { url: String },
    /// Forget the installation's user, resume and credentials.
    ClearStorage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ExtensionResponse {
    JobPageCaptured { job_data: Option<JobDescription> },
    JobData { job_data: Option<JobDescription> },
    JobExtracted {
        job_description: JobDescription,
        placeholder: bool,
    },
    ResumeTailored(TailorOutcome),
    ApplicationSaved { application: ApplicationRecord },
    UserResume { resume: Option<ResumeData> },
    UserResumeSaved { user_id: String, last_sync: String },
    CredentialsStored,
    JobSiteChecked { is_job_site: bool },
    StorageCleared,
}
