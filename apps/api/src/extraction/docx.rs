use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use zip::ZipArchive;

use crate::extraction::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

static TEXT_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("text run pattern is a valid regex")
});

/// Reads the main document part of a DOCX package and returns its text,
/// one line per paragraph.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;
    Ok(document_xml_to_text(&xml))
}

fn document_xml_to_text(xml: &str) -> String {
    let mut paragraphs: Vec<&str> = xml.split("</w:p>").collect();
    // Whatever follows the last paragraph close is section/body markup.
    paragraphs.pop();

    let mut text = String::new();
    for paragraph in paragraphs {
        for run in TEXT_RUN.captures_iter(paragraph) {
            text.push_str(&decode_entities(&run[1]));
        }
        text.push('\n');
    }
    text
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
