use serde::Serialize;

use crate::models::resume::ResumeData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Checks the fields a resume needs before it can be tailored. Every failed
/// check is reported, in a fixed order.
pub fn validate_resume(resume: &ResumeData) -> ValidationReport {
    let contact = &resume.contact;
    let checks = [
        (contact.name.trim().is_empty(), "Missing name"),
        (contact.email.trim().is_empty(), "Missing email"),
        (contact.phone.trim().is_empty(), "Missing phone"),
        (resume.skills.is_empty(), "No skills listed"),
        (resume.experience.is_empty(), "No experience listed"),
        (resume.education.is_empty(), "No education listed"),
    ];

    let errors: Vec<String> = checks
        .iter()
        .filter(|(failed, _)| *failed)
        .map(|(_, message)| message.to_string())
        .collect();

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
