use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured job posting. Derived once per tailoring attempt and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl JobDescription {
    pub const UNKNOWN_TITLE: &'static str = "Unknown Position";
    pub const UNKNOWN_COMPANY: &'static str = "Unknown Company";

    /// Placeholder used when the posting could not be structured.
    pub fn unstructured(text: &str) -> Self {
        Self {
            title: Self::UNKNOWN_TITLE.to_string(),
            company: Self::UNKNOWN_COMPANY.to_string(),
            description: text.to_string(),
            ..Default::default()
        }
    }

    /// Skills followed by requirements, in job-list order. This is the keyword
    /// set every scorer works against.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .chain(self.requirements.iter())
            .map(String::as_str)
    }
}
