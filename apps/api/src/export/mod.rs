//! Exporter — serializes a `RenderedDocument` into a downloadable artifact.
//!
//! Every block is first lowered to a format-neutral `Primitive` through one
//! static table. A block with no table entry fails the whole export with
//! `UnsupportedBlockError` before any bytes are produced. The backends then
//! decide how each primitive looks in their format.

pub mod docx;
pub mod markdown;
pub mod metrics;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::errors::{FieldIssue, ValidationError};
use crate::render::{Block, RenderedDocument};

// ────────────────────────────────────────────────────────────────────────────
// Formats and artifacts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Markdown,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            other => Err(ValidationError::single(FieldIssue::new(
                "format",
                format!("format '{other}' unsupported (expected pdf, docx or markdown)"),
            ))),
        }
    }
}

/// Serialized document bytes plus the format they are in.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: ExportFormat,
    pub bytes: Bytes,
}

impl Artifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }
}

/// Page geometry and type sizes, in PDF points. DOCX sizes are derived from the
/// same values.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub page_width: i64,
    pub page_height: i64,
    pub margin: i64,
    pub body_size: i64,
    /// Sizes for heading levels 1, 2 and 3.
    pub heading_sizes: [i64; 3],
}

impl Default for ExportConfig {
    /// US letter, one-inch margins, 11pt body.
    fn default() -> Self {
        Self {
            page_width: 612,
            page_height: 792,
            margin: 72,
            body_size: 11,
            heading_sizes: [20, 14, 12],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{block} cannot be exported to {format}")]
pub struct UnsupportedBlockError {
    pub block: String,
    pub format: ExportFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to write {format}: {message}")]
pub struct ExportIoError {
    pub format: ExportFormat,
    pub message: String,
}

impl ExportIoError {
    pub fn new(format: ExportFormat, err: impl fmt::Display) -> Self {
        Self {
            format,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedBlockError),
    #[error(transparent)]
    Io(#[from] ExportIoError),
}

// ────────────────────────────────────────────────────────────────────────────
// Block → primitive table
// ────────────────────────────────────────────────────────────────────────────

/// Format-neutral role of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Title,
    SectionHeading,
    EntryHeading,
    Body,
    Bullet,
}

/// Primitive for heading levels 1..=3, indexed by `level - 1`.
static HEADING_PRIMITIVES: [Primitive; 3] = [
    Primitive::Title,
    Primitive::SectionHeading,
    Primitive::EntryHeading,
];

/// One primitive and the text lines it applies to. A bullet list lowers to one
/// `Bullet` run whose lines are the items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styled<'a> {
    pub primitive: Primitive,
    pub lines: Vec<&'a str>,
}

pub fn primitive_for(block: &Block, format: ExportFormat) -> Result<Primitive, UnsupportedBlockError> {
    match block {
        Block::Heading { level, .. } => usize::from(*level)
            .checked_sub(1)
            .and_then(|i| HEADING_PRIMITIVES.get(i))
            .copied()
            .ok_or_else(|| UnsupportedBlockError {
                block: block.describe(),
                format,
            }),
        Block::Paragraph { .. } => Ok(Primitive::Body),
        Block::BulletList { .. } => Ok(Primitive::Bullet),
    }
}

/// Walks the blocks once, mapping each to its primitive.
pub fn lower(
    doc: &RenderedDocument,
    format: ExportFormat,
) -> Result<Vec<Styled<'_>>, UnsupportedBlockError> {
    doc.blocks
        .iter()
        .map(|block| {
            let primitive = primitive_for(block, format)?;
            let lines = match block {
                Block::Heading { text, .. } | Block::Paragraph { text } => vec![text.as_str()],
                Block::BulletList { items } => items.iter().map(String::as_str).collect(),
            };
            Ok(Styled { primitive, lines })
        })
        .collect()
}

/// Serializes `doc` in `format`. Nothing is returned unless every block maps
/// and the backend finishes.
pub fn export(
    doc: &RenderedDocument,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Artifact, ExportError> {
    let styled = lower(doc, format)?;
    let bytes = match format {
        ExportFormat::Pdf => pdf::write_pdf(&styled, config)?,
        ExportFormat::Docx => docx::write_docx(&styled, config)?,
        ExportFormat::Markdown => markdown::write_markdown(&styled).into_bytes(),
    };

    info!(
        "Exported {} template as {} ({} blocks, {} bytes)",
        doc.template,
        format,
        doc.blocks.len(),
        bytes.len()
    );

    Ok(Artifact {
        format,
        bytes: Bytes::from(bytes),
    })
}
