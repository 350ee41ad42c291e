//! Resume Tailoring: orchestrates the three-step tailoring pipeline.
//!
//! Flow: validate → extract_job_requirements → tailor_resume_for_job →
//!       ats_scorer.score → return outcome.
//!
//! Steps run strictly in sequence, one model call each. Transport failures
//! propagate as `ServiceUnavailable`; malformed replies degrade to placeholder
//! values and the step is recorded in `TailorOutcome::fallbacks`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::reply::parse_reply;
use crate::llm_client::TextCompletion;
use crate::models::job::JobDescription;
use crate::models::resume::ResumeData;
use crate::models::score::AtsScore;
use crate::resume::validation::validate_resume;
use crate::tailoring::ats_scoring::AtsScorer;
use crate::tailoring::prompts::{
    JOB_EXTRACTION_PROMPT_TEMPLATE, PROFILE_ANALYSIS_PROMPT_TEMPLATE, TAILOR_PROMPT_TEMPLATE,
};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailorStep {
    ExtractJobRequirements,
    TailorResume,
    CalculateAtsScore,
}

/// Output of a single step. `placeholder` marks a fallback value.
#[derive(Debug, Clone)]
pub struct StepOutput<T> {
    pub value: T,
    pub placeholder: bool,
}

impl<T> StepOutput<T> {
    fn real(value: T) -> Self {
        Self {
            value,
            placeholder: false,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            placeholder: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorOutcome {
    pub tailored_resume: ResumeData,
    pub ats_score: AtsScore,
    pub job_description: JobDescription,
    /// Steps whose output is a placeholder rather than a model result.
    pub fallbacks: Vec<TailorStep>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JobExtractionReply {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    requirements: Vec<String>,
    skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TailorReply {
    tailored_summary: Option<String>,
    tailored_experience: Vec<TailoredExperience>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TailoredExperience {
    original_title: String,
    new_description: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full tailoring pipeline for one master resume and one posting.
///
/// The resume is validated and the posting checked for content before any
/// model call is made.
pub async fn tailor(
    llm: &dyn TextCompletion,
    scorer: &dyn AtsScorer,
    master_resume: &ResumeData,
    job_text: &str,
) -> Result<TailorOutcome, AppError> {
    let report = validate_resume(master_resume);
    if !report.is_valid {
        return Err(AppError::Validation(report.errors.join("; ")));
    }
    if job_text.trim().is_empty() {
        return Err(AppError::Validation("Job description text cannot be empty".to_string()));
    }

    let mut fallbacks = Vec::new();

    // Step 1: structure the posting
    let job = extract_job_requirements(llm, job_text).await?;
    if job.placeholder {
        fallbacks.push(TailorStep::ExtractJobRequirements);
    }
    let job_description = job.value;
    info!(
        "Job structured: '{}' at '{}' ({} skills, {} requirements)",
        job_description.title,
        job_description.company,
        job_description.skills.len(),
        job_description.requirements.len()
    );

    // Step 2: rewrite summary and bullets
    let tailored = tailor_resume_for_job(llm, master_resume, &job_description).await?;
    if tailored.placeholder {
        fallbacks.push(TailorStep::TailorResume);
    }
    let tailored_resume = tailored.value;

    // Step 3: score the tailored result
    let scored = scorer.score(llm, &tailored_resume, &job_description).await?;
    if scored.placeholder {
        fallbacks.push(TailorStep::CalculateAtsScore);
    }
    info!(
        "Tailored resume scored {}/100 ({}% keyword match, backend={})",
        scored.ats_score.score, scored.ats_score.match_percentage, scored.backend
    );

    Ok(TailorOutcome {
        tailored_resume,
        ats_score: scored.ats_score,
        job_description,
        fallbacks,
    })
}

/// Step 1: asks the model to structure raw posting text.
///
/// Falls back to `JobDescription::unstructured` when the reply has no usable
/// JSON object.
pub async fn extract_job_requirements(
    llm: &dyn TextCompletion,
    job_text: &str,
) -> Result<StepOutput<JobDescription>, AppError> {
    let prompt = JOB_EXTRACTION_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{jd_text}", job_text);

    let text = llm.generate(&prompt).await?;

    match parse_reply::<JobExtractionReply>(&text) {
        Ok(reply) => Ok(StepOutput::real(JobDescription {
            title: non_blank_or(reply.title, JobDescription::UNKNOWN_TITLE),
            company: non_blank_or(reply.company, JobDescription::UNKNOWN_COMPANY),
            location: reply.location.filter(|l| !l.trim().is_empty()),
            description: reply
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| job_text.to_string()),
            requirements: reply.requirements,
            skills: reply.skills,
            url: None,
            extracted_at: Some(Utc::now()),
        })),
        Err(e) => {
            warn!("extract_job_requirements: malformed model reply, using placeholder: {e}");
            Ok(StepOutput::fallback(JobDescription::unstructured(job_text)))
        }
    }
}

/// Step 2: asks the model to rewrite the summary and per-role bullets.
///
/// Tailored roles are matched to the originals by exact title. Unmatched
/// roles keep their bullets; an unparseable reply returns the master resume.
pub async fn tailor_resume_for_job(
    llm: &dyn TextCompletion,
    master_resume: &ResumeData,
    job: &JobDescription,
) -> Result<StepOutput<ResumeData>, AppError> {
    let prompt = build_tailor_prompt(master_resume, job);
    let text = llm.generate(&prompt).await?;

    let reply = match parse_reply::<TailorReply>(&text) {
        Ok(reply) => reply,
        Err(e) => {
            warn!("tailor_resume_for_job: malformed model reply, keeping master resume: {e}");
            return Ok(StepOutput::fallback(master_resume.clone()));
        }
    };

    Ok(StepOutput::real(merge_tailoring(master_resume, reply)))
}

fn merge_tailoring(master: &ResumeData, reply: TailorReply) -> ResumeData {
    let mut tailored = master.clone();

    if let Some(summary) = reply.tailored_summary.filter(|s| !s.trim().is_empty()) {
        tailored.summary = Some(summary);
    }

    for exp in &mut tailored.experience {
        let rewritten = reply
            .tailored_experience
            .iter()
            .find(|t| t.original_title == exp.title)
            .filter(|t| !t.new_description.is_empty());
        if let Some(rewritten) = rewritten {
            exp.description = rewritten.new_description.clone();
        }
    }

    tailored
}

fn build_tailor_prompt(resume: &ResumeData, job: &JobDescription) -> String {
    let experience = resume
        .experience
        .iter()
        .map(|e| format!("{} at {}: {}", e.title, e.company, e.description.join(" ")))
        .collect::<Vec<_>>()
        .join("\n\n");

    TAILOR_PROMPT_TEMPLATE
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{job_title}", &job.title)
        .replace("{company}", &job.company)
        .replace("{skills}", &job.skills.join(", "))
        .replace("{name}", &resume.contact.name)
        .replace("{summary}", resume.summary_text().unwrap_or("No summary"))
        .replace("{resume_skills}", &resume.skills.join(", "))
        .replace("{experience}", &experience)
}

/// Asks the model for a short free-text analysis of the candidate's profile.
pub async fn analyze_master_resume(
    llm: &dyn TextCompletion,
    resume: &ResumeData,
) -> Result<String, AppError> {
    let experience = resume
        .experience
        .iter()
        .map(|e| {
            let end = if e.is_currently_working {
                "Present"
            } else {
                e.end_date.as_deref().unwrap_or("Present")
            };
            format!("{} at {} ({} - {})", e.title, e.company, e.start_date, end)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let education = resume
        .education
        .iter()
        .map(|e| {
            format!(
                "{} in {} from {} ({})",
                e.degree, e.field, e.institution, e.graduation_date
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = PROFILE_ANALYSIS_PROMPT_TEMPLATE
        .replace("{name}", &resume.contact.name)
        .replace("{email}", &resume.contact.email)
        .replace("{summary}", resume.summary_text().unwrap_or("No summary"))
        .replace("{skills}", &resume.skills.join(", "))
        .replace("{experience}", &experience)
        .replace("{education}", &education);

    Ok(llm.generate(&prompt).await?.trim().to_string())
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedCompletion;
    use crate::models::resume::{ContactInfo, Education, Experience};
    use crate::tailoring::ats_scoring::{HeuristicAtsScorer, LlmAtsScorer};

    const POSTING: &str = "Senior Backend Engineer at Globex\nRequirements:\n- Python\n- AWS";

    fn master() -> ResumeData {
        ResumeData {
            contact: ContactInfo {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-0100".to_string(),
                ..Default::default()
            },
            summary: Some("Backend engineer".to_string()),
            skills: vec!["python".to_string(), "postgres".to_string()],
            experience: vec![
                Experience {
                    title: "Software Engineer".to_string(),
                    company: "Initech".to_string(),
                    start_date: "2019".to_string(),
                    description: vec!["Built APIs".to_string()],
                    ..Default::default()
                },
                Experience {
                    title: "Intern".to_string(),
                    company: "Hooli".to_string(),
                    start_date: "2018".to_string(),
                    end_date: Some("2019".to_string()),
                    description: vec!["Wrote tests".to_string()],
                    ..Default::default()
                },
            ],
            education: vec![Education {
                institution: "State University".to_string(),
                degree: "BSc".to_string(),
                field: "CS".to_string(),
                graduation_date: "2018".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    const JOB_REPLY: &str = r#"{"title": "Senior Backend Engineer", "company": "Globex", "location": "Remote", "requirements": ["5 years Python"], "skills": ["python", "aws"]}"#;

    const TAILOR_REPLY: &str = r#"```json
{
  "tailoredSummary": "Backend engineer focused on Python services on AWS",
  "tailoredExperience": [
    {"originalTitle": "Software Engineer", "newDescription": ["Built Python APIs on AWS", "Cut latency 30%"]},
    {"originalTitle": "Staff Engineer", "newDescription": ["Should not apply"]}
  ],
  "keywordMatches": ["python", "aws"]
}
```"#;

    #[tokio::test]
    async fn test_extract_job_requirements_parses_reply() {
        let llm = ScriptedCompletion::replying(&[JOB_REPLY]);
        let step = extract_job_requirements(&llm, POSTING).await.unwrap();
        assert!(!step.placeholder);
        assert_eq!(step.value.title, "Senior Backend Engineer");
        assert_eq!(step.value.skills, vec!["python", "aws"]);
        assert_eq!(step.value.location.as_deref(), Some("Remote"));
        // the model does not echo the posting back, so the original text is kept
        assert_eq!(step.value.description, POSTING);
        assert!(step.value.extracted_at.is_some());
        assert!(llm.prompts()[0].contains(POSTING));
    }

    #[tokio::test]
    async fn test_extract_job_requirements_non_json_falls_back_to_default() {
        let llm = ScriptedCompletion::replying(&["Sorry, I can't help with that."]);
        let step = extract_job_requirements(&llm, POSTING).await.unwrap();
        assert!(step.placeholder);
        assert_eq!(step.value, JobDescription::unstructured(POSTING));
        assert_eq!(step.value.description, POSTING);
    }

    #[tokio::test]
    async fn test_extract_job_requirements_propagates_outage() {
        let llm = ScriptedCompletion::unavailable();
        let result = extract_job_requirements(&llm, POSTING).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_tailoring_matches_roles_by_exact_title() {
        let llm = ScriptedCompletion::replying(&[TAILOR_REPLY]);
        let job = JobDescription::unstructured(POSTING);
        let step = tailor_resume_for_job(&llm, &master(), &job).await.unwrap();
        let resume = step.value;
        assert!(!step.placeholder);
        assert_eq!(
            resume.summary.as_deref(),
            Some("Backend engineer focused on Python services on AWS")
        );
        assert_eq!(
            resume.experience[0].description,
            vec!["Built Python APIs on AWS", "Cut latency 30%"]
        );
        // no tailored entry titled "Intern": original bullets survive
        assert_eq!(resume.experience[1].description, vec!["Wrote tests"]);
        assert_eq!(resume.contact, master().contact);
        assert_eq!(resume.skills, master().skills);
    }

    #[tokio::test]
    async fn test_tailoring_blank_summary_keeps_master_summary() {
        let llm = ScriptedCompletion::replying(&[r#"{"tailoredSummary": "  ", "tailoredExperience": []}"#]);
        let step = tailor_resume_for_job(&llm, &master(), &JobDescription::default())
            .await
            .unwrap();
        assert_eq!(step.value, master());
        assert!(!step.placeholder);
    }

    #[tokio::test]
    async fn test_tailoring_malformed_reply_returns_master() {
        let llm = ScriptedCompletion::replying(&["{not json at all"]);
        let step = tailor_resume_for_job(&llm, &master(), &JobDescription::default())
            .await
            .unwrap();
        assert!(step.placeholder);
        assert_eq!(step.value, master());
    }

    #[tokio::test]
    async fn test_full_pipeline_with_heuristic_scorer() {
        let llm = ScriptedCompletion::replying(&[JOB_REPLY, TAILOR_REPLY]);
        let outcome = tailor(&llm, &HeuristicAtsScorer, &master(), POSTING)
            .await
            .unwrap();
        assert!(outcome.fallbacks.is_empty());
        assert_eq!(outcome.job_description.company, "Globex");
        assert!(outcome.ats_score.keyword_matches.contains(&"aws".to_string()));
        assert_eq!(llm.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_full_pipeline_records_every_fallback() {
        let llm = ScriptedCompletion::replying(&["no", "still no", "nope"]);
        let outcome = tailor(&llm, &LlmAtsScorer, &master(), POSTING).await.unwrap();
        assert_eq!(
            outcome.fallbacks,
            vec![
                TailorStep::ExtractJobRequirements,
                TailorStep::TailorResume,
                TailorStep::CalculateAtsScore
            ]
        );
        assert_eq!(outcome.tailored_resume, master());
        assert_eq!(outcome.ats_score, AtsScore::empty());
    }

    #[tokio::test]
    async fn test_invalid_resume_fails_before_any_model_call() {
        let llm = ScriptedCompletion::replying(&[JOB_REPLY]);
        let mut resume = master();
        resume.skills.clear();
        let result = tailor(&llm, &HeuristicAtsScorer, &resume, POSTING).await;
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("No skills listed")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_blank_posting_is_rejected() {
        let llm = ScriptedCompletion::default();
        let result = tailor(&llm, &HeuristicAtsScorer, &master(), "   \n").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_outage_mid_pipeline_propagates() {
        let llm = ScriptedCompletion::replying(&[JOB_REPLY]);
        // second call finds the script empty and errors
        let result = tailor(&llm, &HeuristicAtsScorer, &master(), POSTING).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_analyze_master_resume_returns_trimmed_text() {
        let llm = ScriptedCompletion::replying(&["  Strong backend profile.\n"]);
        let analysis = analyze_master_resume(&llm, &master()).await.unwrap();
        assert_eq!(analysis, "Strong backend profile.");
        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Intern at Hooli (2018 - 2019)"));
        assert!(prompt.contains("Software Engineer at Initech (2019 - Present)"));
    }
}
