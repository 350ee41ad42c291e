//! ATS Scoring: pluggable, trait-based scorer for a resume against a job.
//!
//! Default: `HeuristicAtsScorer` (pure-Rust, deterministic, fully testable).
//! Alternative: `LlmAtsScorer` (asks the language model for the same shape).
//!
//! `AppState` holds an `Arc<dyn AtsScorer>`, chosen at startup via config.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::reply::parse_reply;
use crate::llm_client::TextCompletion;
use crate::models::job::JobDescription;
use crate::models::resume::ResumeData;
use crate::models::score::AtsScore;
use crate::tailoring::prompts::{ATS_SCORE_PROMPT_TEMPLATE, ATS_SCORE_SYSTEM};

// ────────────────────────────────────────────────────────────────────────────
// Point budget (total 100)
// ────────────────────────────────────────────────────────────────────────────

const EMAIL_POINTS: f64 = 3.0;
const PHONE_POINTS: f64 = 3.0;
const NAME_POINTS: f64 = 4.0;
const SUMMARY_POINTS: f64 = 5.0;
const POINTS_PER_SKILL: f64 = 2.0;
const SKILLS_CAP: f64 = 15.0;
const POINTS_PER_EXPERIENCE: f64 = 8.0;
const EXPERIENCE_CAP: f64 = 30.0;
const POINTS_PER_DEGREE: f64 = 7.0;
const EDUCATION_CAP: f64 = 15.0;
const KEYWORD_CAP: f64 = 25.0;
const FORMATTING_POINTS: f64 = 5.0;

const TARGET_SKILL_COUNT: usize = 10;
const MIN_BULLETS_PER_ROLE: usize = 3;
const MISSING_KEYWORDS_REPORTED: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Score plus where it came from. `placeholder` is set when the backend could
/// not produce a real score and returned the all-zero fallback instead.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub ats_score: AtsScore,
    pub backend: &'static str,
    pub placeholder: bool,
}

/// The ATS scorer trait. Implement this to swap backends without touching
/// the orchestrator or handlers. The completion service is passed per call so
/// an install-specific key reaches model-backed scorers.
#[async_trait]
pub trait AtsScorer: Send + Sync {
    async fn score(
        &self,
        llm: &dyn TextCompletion,
        resume: &ResumeData,
        job: &JobDescription,
    ) -> Result<ScoreReport, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicAtsScorer
// ────────────────────────────────────────────────────────────────────────────

/// Fixed point-weighted heuristic plus keyword overlap. No model call.
pub struct HeuristicAtsScorer;

#[async_trait]
impl AtsScorer for HeuristicAtsScorer {
    async fn score(
        &self,
        _llm: &dyn TextCompletion,
        resume: &ResumeData,
        job: &JobDescription,
    ) -> Result<ScoreReport, AppError> {
        Ok(ScoreReport {
            ats_score: analyze_ats_compatibility(resume, job),
            backend: "heuristic",
            placeholder: false,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmAtsScorer
// ────────────────────────────────────────────────────────────────────────────

/// Asks the model to score. An unparseable reply degrades to `AtsScore::empty()`.
pub struct LlmAtsScorer;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AtsScoreReply {
    score: Option<f64>,
    match_percentage: Option<f64>,
    matched_keywords: Option<Vec<String>>,
    missing_keywords: Option<Vec<String>>,
    improvements: Option<Vec<String>>,
}

impl From<AtsScoreReply> for AtsScore {
    fn from(reply: AtsScoreReply) -> Self {
        AtsScore {
            score: clamp_percent(reply.score),
            match_percentage: clamp_percent(reply.match_percentage),
            keyword_matches: reply.matched_keywords.unwrap_or_default(),
            missing_keywords: reply.missing_keywords.unwrap_or_default(),
            improvements: reply.improvements.unwrap_or_default(),
        }
    }
}

fn clamp_percent(value: Option<f64>) -> u32 {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u32)
        .unwrap_or(0)
}

#[async_trait]
impl AtsScorer for LlmAtsScorer {
    async fn score(
        &self,
        llm: &dyn TextCompletion,
        resume: &ResumeData,
        job: &JobDescription,
    ) -> Result<ScoreReport, AppError> {
        let prompt = ATS_SCORE_PROMPT_TEMPLATE
            .replace("{system}", ATS_SCORE_SYSTEM)
            .replace("{resume_text}", &resume_plain_text(resume))
            .replace("{requirements}", &job.requirements.join(", "))
            .replace("{skills}", &job.skills.join(", "));

        let text = llm.generate(&prompt).await?;

        match parse_reply::<AtsScoreReply>(&text) {
            Ok(reply) => Ok(ScoreReport {
                ats_score: reply.into(),
                backend: "llm",
                placeholder: false,
            }),
            Err(e) => {
                warn!("calculate_ats_score: malformed model reply, using empty score: {e}");
                Ok(ScoreReport {
                    ats_score: AtsScore::empty(),
                    backend: "llm",
                    placeholder: true,
                })
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core heuristic
// ────────────────────────────────────────────────────────────────────────────

/// Scores `resume` against `job`. Pure: identical inputs give identical output.
pub fn analyze_ats_compatibility(resume: &ResumeData, job: &JobDescription) -> AtsScore {
    let resume_text = build_resume_text(resume);
    let keywords: Vec<String> = job.keywords().map(str::to_lowercase).collect();

    let (keyword_matches, missing_keywords): (Vec<String>, Vec<String>) = keywords
        .iter()
        .cloned()
        .partition(|k| keyword_present(&resume_text, k));

    let match_percentage = percentage(keyword_matches.len(), keywords.len());
    let score = weighted_score(resume, keyword_matches.len(), keywords.len());
    let improvements = generate_improvements(resume, &resume_text, &missing_keywords);

    AtsScore {
        score,
        match_percentage,
        keyword_matches,
        missing_keywords,
        improvements,
    }
}

/// Lower-cased concatenation of every scorable part of the resume.
pub fn build_resume_text(resume: &ResumeData) -> String {
    let mut parts: Vec<String> = vec![resume.contact.name.clone()];
    if let Some(summary) = &resume.summary {
        parts.push(summary.clone());
    }
    parts.push(resume.skills.join(" "));
    for exp in &resume.experience {
        parts.push(format!(
            "{} {} {}",
            exp.title,
            exp.company,
            exp.description.join(" ")
        ));
    }
    for edu in &resume.education {
        parts.push(format!("{} {} {}", edu.degree, edu.field, edu.institution));
    }
    for project in resume.projects() {
        parts.push(format!(
            "{} {} {}",
            project.title,
            project.description,
            project.technologies.join(" ")
        ));
    }

    parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Alternate spellings of a lower-cased keyword, the keyword itself first.
pub fn keyword_variations(keyword: &str) -> Vec<String> {
    let mut variations = vec![keyword.to_string()];
    let mut push = |v: String| {
        if !variations.contains(&v) {
            variations.push(v);
        }
    };

    if keyword.contains('+') {
        push(keyword.replace('+', " plus"));
        push(keyword.replace('+', ""));
    }
    if keyword.contains('#') {
        push(keyword.replace('#', "sharp"));
        push(keyword.replace('#', ""));
    }
    if keyword.contains('.') {
        push(keyword.replace('.', ""));
    }
    if keyword.contains('-') {
        push(keyword.replace('-', " "));
    }

    variations
}

fn keyword_present(resume_text: &str, keyword: &str) -> bool {
    keyword_variations(&keyword.to_lowercase())
        .iter()
        .any(|v| resume_text.contains(v.as_str()))
}

fn percentage(matched: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (matched as f64 / total as f64 * 100.0).round() as u32
}

fn weighted_score(resume: &ResumeData, matched: usize, total: usize) -> u32 {
    let mut score = base_score(resume);

    if total > 0 {
        score += (matched as f64 / total as f64 * KEYWORD_CAP).min(KEYWORD_CAP);
    }

    score.round().min(100.0) as u32
}

/// Every component except keyword overlap.
fn base_score(resume: &ResumeData) -> f64 {
    let mut score = 0.0;

    if !resume.contact.email.trim().is_empty() {
        score += EMAIL_POINTS;
    }
    if !resume.contact.phone.trim().is_empty() {
        score += PHONE_POINTS;
    }
    if !resume.contact.name.trim().is_empty() {
        score += NAME_POINTS;
    }
    if resume.summary_text().is_some() {
        score += SUMMARY_POINTS;
    }

    score += (resume.distinct_skills().len() as f64 * POINTS_PER_SKILL).min(SKILLS_CAP);
    score += (resume.experience.len() as f64 * POINTS_PER_EXPERIENCE).min(EXPERIENCE_CAP);
    score += (resume.education.len() as f64 * POINTS_PER_DEGREE).min(EDUCATION_CAP);

    // No layout inspection: every resume is assumed well formatted.
    score + FORMATTING_POINTS
}

/// Suggestions in fixed rule order.
fn generate_improvements(
    resume: &ResumeData,
    resume_text: &str,
    missing_keywords: &[String],
) -> Vec<String> {
    let mut improvements = Vec::new();

    if resume.summary_text().is_none() {
        improvements.push("Add a professional summary that highlights key skills".to_string());
    }

    let skill_count = resume.distinct_skills().len();
    if skill_count < TARGET_SKILL_COUNT {
        improvements.push(format!(
            "Add more skills (currently have {}, aim for {}+)",
            skill_count,
            TARGET_SKILL_COUNT
        ));
    }

    if resume.experience.is_empty() {
        improvements.push("Add professional experience details".to_string());
    }

    if resume.education.is_empty() {
        improvements.push("Add education information".to_string());
    }

    if !missing_keywords.is_empty() {
        let critical: Vec<&str> = missing_keywords
            .iter()
            .take(MISSING_KEYWORDS_REPORTED)
            .map(String::as_str)
            .collect();
        improvements.push(format!("Incorporate key skills: {}", critical.join(", ")));
    }

    for exp in &resume.experience {
        if exp.description.len() < MIN_BULLETS_PER_ROLE {
            improvements.push(format!(
                "Add more bullet points to {} role (currently {})",
                exp.title,
                exp.description.len()
            ));
        }
    }

    if !resume_text.contains("achievements") && !resume_text.contains("accomplishments") {
        improvements.push("Quantify achievements with metrics and results".to_string());
    }

    improvements
}

/// General ATS-friendly formatting tips, independent of any job.
pub fn formatting_guidelines() -> Vec<&'static str> {
    vec![
        "Use standard fonts: Arial, Calibri, or Times New Roman",
        "Keep file format as .docx or .pdf",
        "Use clear section headers (EXPERIENCE, EDUCATION, SKILLS)",
        "Avoid tables, graphics, and special formatting",
        "Use bullet points for easy scanning",
        "Include relevant keywords from the job description",
        "Keep to 1-2 pages",
        "Use consistent date formatting",
        "Avoid headers, footers, and unusual spacing",
    ]
}

/// Un-lowercased resume text sent to the model scorer.
fn resume_plain_text(resume: &ResumeData) -> String {
    [
        resume.contact.name.clone(),
        resume.summary.clone().unwrap_or_default(),
        resume.skills.join(" "),
        resume
            .experience
            .iter()
            .map(|e| format!("{} {} {}", e.title, e.company, e.description.join(" ")))
            .collect::<Vec<_>>()
            .join(" "),
        resume
            .education
            .iter()
            .map(|e| format!("{} {} {}", e.degree, e.field, e.institution))
            .collect::<Vec<_>>()
            .join(" "),
    ]
    .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
