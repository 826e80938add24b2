//! Template Renderer — turns a `DocumentModel` into an ordered list of typed
//! blocks according to a named template.

pub mod renderer;
pub mod templates;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use renderer::render;

/// One layout unit of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    BulletList { items: Vec<String> },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Short type name used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Block::Heading { level, .. } => format!("heading level {level}"),
            Block::Paragraph { .. } => "paragraph".to_string(),
            Block::BulletList { .. } => "bullet list".to_string(),
        }
    }
}

/// Immutable render output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub template: TemplateId,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    Resume,
    CoverLetter,
}

impl TemplateId {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Resume => "resume",
            TemplateId::CoverLetter => "cover-letter",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown template '{0}' (expected 'resume' or 'cover-letter')")]
pub struct UnknownTemplateError(pub String);

impl FromStr for TemplateId {
    type Err = UnknownTemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(TemplateId::Resume),
            "cover-letter" | "cover_letter" => Ok(TemplateId::CoverLetter),
            _ => Err(UnknownTemplateError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_id_parses_known_names() {
        assert_eq!("resume".parse::<TemplateId>().unwrap(), TemplateId::Resume);
        assert_eq!("Cover-Letter".parse::<TemplateId>().unwrap(), TemplateId::CoverLetter);
        assert_eq!("cover_letter".parse::<TemplateId>().unwrap(), TemplateId::CoverLetter);
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let err = "brochure".parse::<TemplateId>().unwrap_err();
        assert_eq!(err, UnknownTemplateError("brochure".to_string()));
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let json = serde_json::to_value(Block::heading(2, "Experience")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "heading", "level": 2, "text": "Experience"})
        );
    }
}
