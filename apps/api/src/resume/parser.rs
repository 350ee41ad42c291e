//! Heuristic resume parser for plain text pulled out of an upload.
//!
//! Best effort: whatever is not recognised is left empty and surfaces later
//! through `validate_resume`.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::resume::{ContactInfo, Education, Experience, ResumeData};

const UNKNOWN_DATE: &str = "Unknown";

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("Invalid email regex"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
            .expect("Invalid phone regex")
    })
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(https?://\S+|www\.\S+)").expect("Invalid URL regex"))
}

/// "Title at Company, 2019 - Present" on a line of its own.
fn experience_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*([A-Z][A-Za-z /&]+?)\s+(?:at|@)\s+([A-Z][A-Za-z0-9 &.\-]+?)(?:\s*[,|(]?\s*(\d{4})\s*[-–]\s*(\d{4}|(?i:present|now|current))?\)?)?[ \t\r]*$",
        )
        .expect("Invalid experience regex")
    })
}

/// "Bachelor in Computer Science from State University".
fn education_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"((?i:bachelor|master|phd|associate)|B\.S\.|M\.S\.|B\.A\.|M\.A\.)[^\n]*?\s(?:in|of)\s+([A-Za-z ]+?)\s*(?:\bfrom\b|\bat\b|,|\()\s*([A-Z][A-Za-z .&\-]*?(?:University|College|Institute))",
        )
        .expect("Invalid education regex")
    })
}

/// Parses resume text into structured data.
pub fn parse_resume_text(text: &str) -> ResumeData {
    let name = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    let contact = ContactInfo {
        name,
        email: first_match(email_re(), text).unwrap_or_default(),
        phone: first_match(phone_re(), text).unwrap_or_default(),
        location: String::new(),
        website: first_match(url_re(), text),
        linkedin: None,
        github: None,
    };

    let summary = extract_section(text, &["summary", "profile", "objective"], "experience");

    ResumeData {
        contact,
        summary: (!summary.is_empty()).then(|| summary.join(" ")),
        skills: extract_section(text, &["skills"], "experience"),
        experience: extract_experience(text),
        education: extract_education(text),
        projects: None,
        certifications: None,
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}

/// Items between the first start header and the next `end` header after it,
/// split on commas and newlines. The header word itself is not an item.
fn extract_section(text: &str, start_headers: &[&str], end_header: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    let Some((start, header_len)) = start_headers
        .iter()
        .filter_map(|h| lower.find(h).map(|idx| (idx, h.len())))
        .min_by_key(|(idx, _)| *idx)
    else {
        return Vec::new();
    };

    let body_start = start + header_len;
    let body_end = lower[body_start..]
        .find(end_header)
        .map(|idx| body_start + idx)
        .unwrap_or(lower.len());

    // lowercasing can shift byte offsets for non-ASCII text
    let Some(section) = text.get(body_start..body_end) else {
        return Vec::new();
    };

    section
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .split([',', '\n'])
        .map(|item| item.trim().trim_start_matches(['•', '-', '*']).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_experience(text: &str) -> Vec<Experience> {
    experience_re()
        .captures_iter(text)
        .map(|caps| {
            let end = caps.get(4).map(|m| m.as_str().to_string());
            let is_current = end.as_deref().is_some_and(|e| {
                let e = e.to_lowercase();
                e == "present" || e == "now" || e == "current"
            });
            Experience {
                title: caps[1].trim().to_string(),
                company: caps[2].trim().to_string(),
                location: None,
                start_date: caps
                    .get(3)
                    .map_or(UNKNOWN_DATE.to_string(), |m| m.as_str().to_string()),
                end_date: if is_current { None } else { end },
                is_currently_working: is_current,
                description: Vec::new(),
            }
        })
        .collect()
}

fn extract_education(text: &str) -> Vec<Education> {
    education_re()
        .captures_iter(text)
        .map(|caps| Education {
            institution: caps[3].trim().to_string(),
            degree: caps[1].trim().to_string(),
            field: caps[2].trim().to_string(),
            graduation_date: UNKNOWN_DATE.to_string(),
            gpa: None,
            achievements: None,
        })
        .collect()
}
