use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

use super::DocumentError;

pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PLAIN_TEXT: &str = "text/plain";

/// Extracts plain text from an uploaded resume file.
///
/// Parameters such as `; charset=utf-8` on the content type are ignored.
/// Anything other than PDF, DOCX or plain text is rejected.
pub fn extract_upload_text(data: &[u8], content_type: &str) -> Result<String, DocumentError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let text = match mime.as_str() {
        PDF => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?,
        DOCX => extract_docx_text(data)?,
        PLAIN_TEXT => String::from_utf8(data.to_vec())?,
        _ => return Err(DocumentError::UnsupportedContentType(content_type.to_string())),
    };

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }

    debug!("Extracted {} chars from {mime} upload", text.len());
    Ok(text)
}

/// One line per paragraph, runs concatenated.
fn extract_docx_text(data: &[u8]) -> Result<String, DocumentError> {
    let docx = docx_rs::read_docx(data).map_err(|e| DocumentError::DocxRead(e.to_string()))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{ContactInfo, ResumeData};
    use crate::resume::document::DocxFormatter;
    use crate::resume::{DocumentFormatter, DocumentTarget};

    #[test]
    fn test_plain_text_with_charset() {
        let text = extract_upload_text(b"Jane Doe\nSkills: Rust", "text/plain; charset=utf-8").unwrap();
        assert_eq!(text, "Jane Doe\nSkills: Rust");
    }

    #[test]
    fn test_unsupported_type_is_rejected() {
        let result = extract_upload_text(b"GIF89a", "image/gif");
        assert!(matches!(result, Err(DocumentError::UnsupportedContentType(ct)) if ct == "image/gif"));
    }

    #[test]
    fn test_blank_text_is_empty_error() {
        assert!(matches!(
            extract_upload_text(b"  \n ", PLAIN_TEXT),
            Err(DocumentError::Empty)
        ));
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        assert!(matches!(
            extract_upload_text(&[0xff, 0xfe, 0x00], PLAIN_TEXT),
            Err(DocumentError::Encoding(_))
        ));
    }

    #[test]
    fn test_docx_text_reads_back_rendered_resume() {
        let resume = ResumeData {
            contact: ContactInfo {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            skills: vec!["Rust".to_string(), "Go".to_string()],
            ..Default::default()
        };
        let target = DocumentTarget {
            company: "Acme".to_string(),
            job_title: "Engineer".to_string(),
        };
        let bytes = DocxFormatter.render(&resume, &target).unwrap();

        let text = extract_upload_text(&bytes, DOCX).unwrap();
        assert!(text.starts_with("Jane Doe\n"));
        assert!(text.contains("SKILLS"));
        assert!(text.contains("Rust • Go"));
    }

    #[test]
    fn test_garbage_docx_is_read_error() {
        assert!(matches!(
            extract_upload_text(b"not a zip", DOCX),
            Err(DocumentError::DocxRead(_))
        ));
    }
}
