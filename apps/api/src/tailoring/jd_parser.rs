//! JD Parser: local, deterministic keyword extraction from raw posting text.
//!
//! No LLM call here. The only failure mode is "nothing found", which yields
//! empty lists.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::models::job::JobDescription;

/// Known technology / skill terms, matched as case-insensitive substrings.
/// Scan order is result order.
pub const SKILL_VOCABULARY: &[&str] = &[
    // languages
    "javascript",
    "typescript",
    "python",
    "java",
    "golang",
    "rust",
    "scala",
    "c++",
    "c#",
    "kotlin",
    "swift",
    "ruby",
    "php",
    "matlab",
    "bash",
    "shell",
    "html",
    "css",
    "sql",
    // frameworks
    "react",
    "vue",
    "angular",
    "node",
    "express",
    "next.js",
    "django",
    "flask",
    "spring",
    "graphql",
    "rest api",
    // data stores
    "mongodb",
    "postgres",
    "mysql",
    "oracle",
    "redis",
    "elasticsearch",
    "cassandra",
    "dynamodb",
    "firebase",
    "snowflake",
    // cloud and ops
    "aws",
    "gcp",
    "azure",
    "docker",
    "kubernetes",
    "terraform",
    "ansible",
    "jenkins",
    "ci/cd",
    "devops",
    "serverless",
    "microservices",
    "linux",
    "unix",
    "git",
    // data and ml
    "tensorflow",
    "pytorch",
    "keras",
    "scikit-learn",
    "pandas",
    "numpy",
    "spark",
    "hadoop",
    "kafka",
    "rabbitmq",
    "airflow",
    "etl",
    "tableau",
    "power bi",
    "excel",
    "machine learning",
    "deep learning",
    "nlp",
    "computer vision",
    "data science",
    "data analysis",
    "big data",
    "iot",
    // business tools
    "salesforce",
    "sap",
    "jira",
    "powerpoint",
    "word",
    // practices
    "agile",
    "scrum",
    "kanban",
    "api design",
    "security",
    "encryption",
    "oauth",
    "jwt",
    "testing",
    "unit testing",
    "integration testing",
    "performance testing",
    "load testing",
];

fn requirements_section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)(?:requirement|skill|qualification|must have|should have).*?(?:nice to have|about|$)",
        )
        .expect("Invalid requirements section regex")
    })
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[•\-*]\s+([^\n]+)").expect("Invalid bullet regex"))
}

fn years_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\d+\+?\s*years?").expect("Invalid years regex"))
}

/// Minimum length (in characters) for a bullet to count as a requirement.
const MIN_REQUIREMENT_CHARS: usize = 6;

/// Bullet lines from the first requirements-like section of the posting.
///
/// The section starts at the first header token (requirement, skill,
/// qualification, must have, should have) and ends at "nice to have", "about",
/// or the end of the text.
pub fn extract_requirements(text: &str) -> Vec<String> {
    let Some(section) = requirements_section_re().find(text) else {
        return Vec::new();
    };

    bullet_re()
        .captures_iter(section.as_str())
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|line| line.chars().count() >= MIN_REQUIREMENT_CHARS)
        .collect()
}

/// Vocabulary terms present in the posting, each once, plus the first
/// "N(+) years" phrase verbatim.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    let mut skills: Vec<String> = SKILL_VOCABULARY
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| term.to_string())
        .collect();

    if let Some(years) = years_re().find(text) {
        let years = years.as_str().to_string();
        if !skills.contains(&years) {
            skills.push(years);
        }
    }

    skills
}

/// Builds a partial `JobDescription` from posting text without any model call.
/// Title and company fall back to "Unknown" when the caller has none.
pub fn extract_job_description(
    text: &str,
    title: Option<&str>,
    company: Option<&str>,
    url: Option<&str>,
) -> JobDescription {
    JobDescription {
        title: non_blank(title).unwrap_or("Unknown").to_string(),
        company: non_blank(company).unwrap_or("Unknown").to_string(),
        location: None,
        description: text.to_string(),
        requirements: extract_requirements(text),
        skills: extract_skills(text),
        url: non_blank(url).map(str::to_string),
        extracted_at: Some(Utc::now()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKEND_JD: &str = "Backend Engineer\n\
        We build payment rails.\n\
        Requirements:\n\
        - 5+ years of Python experience\n\
        - Strong SQL and Postgres skills\n\
        * AWS\n\
        • Experience with Docker and Kubernetes\n\
        Nice to have:\n\
        - Kafka streaming experience\n";

    #[test]
    fn test_requirements_stop_at_nice_to_have() {
        let reqs = extract_requirements(BACKEND_JD);
        assert_eq!(
            reqs,
            vec![
                "5+ years of Python experience",
                "Strong SQL and Postgres skills",
                "Experience with Docker and Kubernetes",
            ]
        );
    }

    #[test]
    fn test_short_bullets_are_dropped() {
        // "AWS" is only three characters
        let reqs = extract_requirements(BACKEND_JD);
        assert!(!reqs.iter().any(|r| r == "AWS"));
    }

    #[test]
    fn test_requirements_section_runs_to_end_of_text() {
        let text = "Qualifications\n- Bachelor's degree in CS\n- Excellent communication";
        assert_eq!(
            extract_requirements(text),
            vec!["Bachelor's degree in CS", "Excellent communication"]
        );
    }

    #[test]
    fn test_no_requirements_section_is_empty() {
        assert!(extract_requirements("We are hiring.\n- Great pay\n- Free lunch").is_empty());
    }

    #[test]
    fn test_skills_are_case_insensitive_and_unique() {
        let skills = extract_skills("PYTHON, python and more Python. Also Docker.");
        assert_eq!(skills.iter().filter(|s| *s == "python").count(), 1);
        assert!(skills.contains(&"docker".to_string()));
    }

    #[test]
    fn test_skills_follow_vocabulary_order() {
        let skills = extract_skills("docker then python then aws");
        let pos = |s: &str| skills.iter().position(|x| x == s).unwrap();
        assert!(pos("python") < pos("aws"));
        assert!(pos("aws") < pos("docker"));
    }

    #[test]
    fn test_first_years_phrase_is_added_verbatim() {
        let skills = extract_skills("Need 5+ Years in Rust, 2 years in Go");
        assert!(skills.contains(&"5+ Years".to_string()));
        assert!(!skills.contains(&"2 years".to_string()));
    }

    #[test]
    fn test_no_skills_found_is_empty() {
        assert!(extract_skills("Friendly team, nice office.").is_empty());
    }

    #[test]
    fn test_extract_job_description_defaults_title_and_company() {
        let job = extract_job_description(BACKEND_JD, None, Some("  "), Some("https://jobs.example/1"));
        assert_eq!(job.title, "Unknown");
        assert_eq!(job.company, "Unknown");
        assert_eq!(job.description, BACKEND_JD);
        assert_eq!(job.url.as_deref(), Some("https://jobs.example/1"));
        assert!(job.skills.contains(&"kubernetes".to_string()));
        assert!(job.extracted_at.is_some());
    }
}
