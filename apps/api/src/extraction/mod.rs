//! Text extraction — turns uploaded resume files into plain text.
//!
//! Best effort: layout, tables and images are dropped. Extraction failures are
//! returned as errors so batch callers can report them per document.

pub mod docx;
pub mod email;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Failed to parse DOCX: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Detects the kind from the declared content type, falling back to the
    /// file extension when the type is missing or generic.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some(PDF_MIME) => return Some(Self::Pdf),
            Some(DOCX_MIME) => return Some(Self::Docx),
            Some(m) if m.starts_with("text/") => return Some(Self::PlainText),
            _ => {}
        }

        let ext = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())?;
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "md" | "text" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// One uploaded file, as received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::detect(Some(&self.file_name), self.content_type.as_deref())
    }

    pub fn extract_text(&self) -> Result<String, ExtractionError> {
        extract_text(
            &self.bytes,
            Some(&self.file_name),
            self.content_type.as_deref(),
        )
    }
}

pub fn extract_text(
    bytes: &[u8],
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, ExtractionError> {
    let kind = DocumentKind::detect(file_name, content_type).ok_or_else(|| {
        ExtractionError::UnsupportedType(
            content_type
                .or(file_name)
                .unwrap_or("unknown")
                .to_string(),
        )
    })?;

    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Pdf(e.to_string())),
        DocumentKind::Docx => docx::extract_docx_text(bytes),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}
