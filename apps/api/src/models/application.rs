use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::JobDescription;
use crate::models::resume::ResumeData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "interview" => Ok(ApplicationStatus::Interview),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!(
                "Unknown status '{other}' (expected applied, interview, offer or rejected)"
            )),
        }
    }
}

/// A saved application. Only `status` and `updated_at` change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_id: String,
    pub job_title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    pub job_description: JobDescription,
    pub original_resume: ResumeData,
    pub tailored_resume: ResumeData,
    pub ats_score: u32,
    pub match_percentage: u32,
    pub applied_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Both scores are percentages.
pub const MAX_PERCENT: u32 = 100;

/// Rejects an `atsScore` or `matchPercentage` above 100.
pub fn check_percentages(ats_score: u32, match_percentage: u32) -> Result<(), String> {
    for (field, value) in [("atsScore", ats_score), ("matchPercentage", match_percentage)] {
        if value > MAX_PERCENT {
            return Err(format!("{field} must be between 0 and {MAX_PERCENT}, got {value}"));
        }
    }
    Ok(())
}

/// Request body for saving an application. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub job_url: Option<String>,
    pub job_description: JobDescription,
    pub original_resume: ResumeData,
    pub tailored_resume: ResumeData,
    #[serde(default)]
    pub ats_score: u32,
    #[serde(default)]
    pub match_percentage: u32,
    #[serde(default)]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ApplicationStatus,
}

impl NewApplication {
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            id,
            user_id: self.user_id,
            job_title: self.job_title,
            company: self.company,
            job_url: self.job_url,
            job_description: self.job_description,
            original_resume: self.original_resume,
            tailored_resume: self.tailored_resume,
            ats_score: self.ats_score,
            match_percentage: self.match_percentage,
            applied_date: self.applied_date.unwrap_or(now),
            status: self.status,
            created_at: Some(now),
            updated_at: None,
        }
    }
}
