//! DOCX rendering of a (tailored) resume.
//!
//! Layout is computed first as a list of styled lines, then written with
//! docx-rs. Sizes are in half-points, spacing and indent in twips.

use std::io::Cursor;

use chrono::Utc;
use docx_rs::{Docx, LineSpacing, Paragraph, Run};

use super::{DocumentError, DocumentFormatter, DocumentTarget};
use crate::models::resume::ResumeData;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const BULLET_INDENT: i32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Name,
    ContactLine,
    SectionHeading,
    Body,
    EntryTitle,
    EntrySubtitle,
    Bullet,
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLine {
    pub style: LineStyle,
    pub text: String,
}

impl DocLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

pub struct DocxFormatter;

/// Keeps ASCII letters, digits, `-` and `_`; everything else becomes `_` so the
/// name is safe inside a quoted `Content-Disposition` value.
fn file_name_part(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl DocumentFormatter for DocxFormatter {
    fn content_type(&self) -> &'static str {
        DOCX_CONTENT_TYPE
    }

    fn file_name(&self, target: &DocumentTarget) -> String {
        format!(
            "Resume_{}_{}_{}.docx",
            file_name_part(&target.company),
            file_name_part(&target.job_title),
            Utc::now().format("%Y-%m-%d")
        )
    }

    fn render(&self, resume: &ResumeData, _target: &DocumentTarget) -> Result<Vec<u8>, DocumentError> {
        let docx = layout(resume)
            .into_iter()
            .fold(Docx::new(), |docx, line| docx.add_paragraph(paragraph(&line)));

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| DocumentError::DocxWrite(e.to_string()))?;

        Ok(buffer.into_inner())
    }
}

/// Lines of the rendered document, in order. Empty sections are omitted.
pub fn layout(resume: &ResumeData) -> Vec<DocLine> {
    let contact = &resume.contact;
    let mut lines = vec![DocLine::new(LineStyle::Name, contact.name.as_str())];

    let mut contact_parts: Vec<String> = [&contact.email, &contact.phone, &contact.location]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .cloned()
        .collect();
    if let Some(linkedin) = contact.linkedin.as_deref().filter(|l| !l.trim().is_empty()) {
        contact_parts.push(format!("LinkedIn: {linkedin}"));
    }
    lines.push(DocLine::new(LineStyle::ContactLine, contact_parts.join(" • ")));

    if let Some(summary) = resume.summary_text() {
        lines.push(DocLine::new(LineStyle::SectionHeading, "PROFESSIONAL SUMMARY"));
        lines.push(DocLine::new(LineStyle::Body, summary));
    }

    if !resume.skills.is_empty() {
        lines.push(DocLine::new(LineStyle::SectionHeading, "SKILLS"));
        lines.push(DocLine::new(LineStyle::Body, resume.skills.join(" • ")));
    }

    if !resume.experience.is_empty() {
        lines.push(DocLine::new(LineStyle::SectionHeading, "PROFESSIONAL EXPERIENCE"));
        for exp in &resume.experience {
            lines.push(DocLine::new(LineStyle::EntryTitle, exp.title.as_str()));
            lines.push(DocLine::new(
                LineStyle::EntrySubtitle,
                format!("{} | {}", exp.company, exp.date_range()),
            ));
            lines.extend(
                exp.description
                    .iter()
                    .map(|bullet| DocLine::new(LineStyle::Bullet, bullet.as_str())),
            );
            lines.push(DocLine::new(LineStyle::Spacer, ""));
        }
    }

    if !resume.education.is_empty() {
        lines.push(DocLine::new(LineStyle::SectionHeading, "EDUCATION"));
        for edu in &resume.education {
            lines.push(DocLine::new(
                LineStyle::EntryTitle,
                format!("{} in {}", edu.degree, edu.field),
            ));
            lines.push(DocLine::new(
                LineStyle::EntrySubtitle,
                format!("{} | Graduated: {}", edu.institution, edu.graduation_date),
            ));
        }
    }

    if !resume.projects().is_empty() {
        lines.push(DocLine::new(LineStyle::SectionHeading, "PROJECTS"));
        for project in resume.projects() {
            lines.push(DocLine::new(LineStyle::EntryTitle, project.title.as_str()));
            lines.push(DocLine::new(LineStyle::Body, project.description.as_str()));
        }
    }

    lines
}

fn paragraph(line: &DocLine) -> Paragraph {
    let run = Run::new().add_text(line.text.as_str());
    let (run, after) = match line.style {
        LineStyle::Name => (run.bold().size(28), 200),
        LineStyle::ContactLine => (run.size(20), 400),
        LineStyle::SectionHeading => (run.bold().size(24), 200),
        LineStyle::Body => (run.size(22), 400),
        LineStyle::EntryTitle => (run.bold().size(22), 0),
        LineStyle::EntrySubtitle => (run.italic().size(20), 200),
        LineStyle::Bullet => (run.size(22), 100),
        LineStyle::Spacer => (run, 200),
    };

    let paragraph = Paragraph::new()
        .add_run(run)
        .line_spacing(LineSpacing::new().after(after));

    if line.style == LineStyle::Bullet {
        paragraph.indent(Some(BULLET_INDENT), None, None, None)
    } else {
        paragraph
    }
}
