//! Resume intake and output: text parsing, upload extraction, validation and
//! document formatting.

use thiserror::Error;

use crate::models::resume::ResumeData;

pub mod document;
pub mod handlers;
pub mod parser;
pub mod upload;
pub mod validation;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),

    #[error("no text could be extracted")]
    Empty,

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX read failed: {0}")]
    DocxRead(String),

    #[error("upload is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("DOCX write failed: {0}")]
    DocxWrite(String),
}

/// Company and role a rendered resume is addressed to.
#[derive(Debug, Clone)]
pub struct DocumentTarget {
    pub company: String,
    pub job_title: String,
}

/// Renders a resume into a downloadable document. The byte layout is the
/// formatter's concern; callers only see bytes, a MIME type and a file name.
pub trait DocumentFormatter: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn file_name(&self, target: &DocumentTarget) -> String;

    fn render(&self, resume: &ResumeData, target: &DocumentTarget) -> Result<Vec<u8>, DocumentError>;
}
