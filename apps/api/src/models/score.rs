use serde::{Deserialize, Serialize};

/// Result of scoring a resume against a job description.
///
/// `score` is the weighted 0–100 ATS score; `match_percentage` is the plain
/// keyword hit rate. They measure different things and are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScore {
    pub score: u32,
    pub match_percentage: u32,
    pub keyword_matches: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub improvements: Vec<String>,
}

impl AtsScore {
    /// All-zero placeholder returned when a scoring reply cannot be parsed.
    pub fn empty() -> Self {
        Self::default()
    }
}
