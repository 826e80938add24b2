//! Plain-text extraction from uploaded resume files.
//!
//! PDF parsing is CPU-bound; async callers run `extract_text` inside
//! `tokio::task::spawn_blocking`.

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldIssue, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Docx,
    Text,
}

impl SourceKind {
    /// Identifies the upload from its leading bytes, falling back to the file
    /// extension and declared content type for plain text.
    pub fn detect(bytes: &[u8], file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(SourceKind::Pdf);
        }
        if bytes.starts_with(b"PK\x03\x04") {
            return Some(SourceKind::Docx);
        }

        let extension = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let textual_name = matches!(extension.as_deref(), Some("txt" | "md" | "text"));
        let textual_type = content_type.is_some_and(|t| t.starts_with("text/"));

        ((textual_name || textual_type) && std::str::from_utf8(bytes).is_ok())
            .then_some(SourceKind::Text)
    }
}

fn unreadable(kind: &str, err: impl std::fmt::Display) -> ValidationError {
    ValidationError::single(FieldIssue::new(
        "file",
        format!("file could not be read as {kind}: {err}"),
    ))
}

/// Paragraph texts of a DOCX file, one per line.
pub fn docx_text(bytes: &[u8]) -> Result<String, ValidationError> {
    let docx = read_docx(bytes).map_err(|e| unreadable("DOCX", format!("{e:?}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(
                para.children
                    .iter()
                    .filter_map(|c| match c {
                        ParagraphChild::Run(run) => Some(run),
                        _ => None,
                    })
                    .flat_map(|run| run.children.iter())
                    .filter_map(|rc| match rc {
                        RunChild::Text(t) => Some(t.text.as_str()),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Extracts and normalises the text of an upload. Empty results are rejected.
pub fn extract_text(bytes: &[u8], kind: SourceKind) -> Result<String, ValidationError> {
    let raw = match kind {
        SourceKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| unreadable("PDF", e))?
        }
        SourceKind::Docx => docx_text(bytes)?,
        SourceKind::Text => String::from_utf8(bytes.to_vec()).map_err(|e| unreadable("text", e))?,
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(ValidationError::single(FieldIssue::new(
            "file",
            "no text could be extracted from the file",
        )));
    }
    Ok(text)
}

/// Trims every line, collapses runs of spaces and tabs, drops form feeds and
/// keeps at most one blank line between paragraphs.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blank_pending = false;

    for line in text.replace('\x0c', "\n").lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_pending = !out.is_empty();
            continue;
        }
        if blank_pending {
            out.push(String::new());
            blank_pending = false;
        }
        out.push(line);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_magic_bytes() {
        assert_eq!(SourceKind::detect(b"%PDF-1.7 ...", None, None), Some(SourceKind::Pdf));
        assert_eq!(
            SourceKind::detect(b"PK\x03\x04rest", Some("cv.bin"), None),
            Some(SourceKind::Docx)
        );
    }

    #[test]
    fn test_detect_plain_text_needs_a_textual_hint() {
        assert_eq!(
            SourceKind::detect(b"Jane Doe", Some("cv.TXT"), None),
            Some(SourceKind::Text)
        );
        assert_eq!(
            SourceKind::detect(b"Jane Doe", None, Some("text/plain")),
            Some(SourceKind::Text)
        );
        assert_eq!(SourceKind::detect(b"Jane Doe", Some("cv.rtf"), None), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  Jane   Doe \t\n\n\n\nEngineer\x0cAcme  \n";
        assert_eq!(normalize_whitespace(raw), "Jane Doe\n\nEngineer\nAcme");
    }

    #[test]
    fn test_blank_upload_is_rejected() {
        let err = extract_text(b"  \n\t ", SourceKind::Text).unwrap_err();
        assert!(err.has_message("no text could be extracted from the file"));
    }
}
