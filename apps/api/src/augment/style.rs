//! Style directives — maps a requested writing style to the guideline sentence
//! sent with every rewrite request.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    #[default]
    Professional,
    Friendly,
    Concise,
    Enthusiastic,
    Formal,
}

impl Style {
    /// Guideline text embedded in the prompt for this style.
    pub fn guideline(self) -> &'static str {
        match self {
            Style::Professional => "Formal language, business-appropriate, polished and refined",
            Style::Friendly => "Approachable and warm, while maintaining professionalism",
            Style::Concise => "Direct and to the point, minimal fluff, clear and impactful",
            Style::Enthusiastic => "Energetic and passionate, showing excitement about the role",
            Style::Formal => "Highly structured, traditional business language, proper titles",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Professional => "professional",
            Style::Friendly => "friendly",
            Style::Concise => "concise",
            Style::Enthusiastic => "enthusiastic",
            Style::Formal => "formal",
        };
        f.write_str(name)
    }
}

/// Target length for a rewritten cover letter. Other sections keep their
/// original length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl LetterLength {
    pub fn guideline(self) -> &'static str {
        match self {
            LetterLength::Short => "Keep it brief: about 150 words in two or three short paragraphs",
            LetterLength::Medium => "Aim for about 250 words in three or four paragraphs",
            LetterLength::Long => "Aim for about 400 words in four or five paragraphs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_professional() {
        assert_eq!(Style::default(), Style::Professional);
    }

    #[test]
    fn test_style_deserializes_from_lowercase() {
        let style: Style = serde_json::from_str("\"concise\"").unwrap();
        assert_eq!(style, Style::Concise);
        assert!(style.guideline().starts_with("Direct"));
    }

    #[test]
    fn test_letter_length_defaults_to_medium() {
        assert_eq!(LetterLength::default(), LetterLength::Medium);
        let length: LetterLength = serde_json::from_str("\"short\"").unwrap();
        assert!(length.guideline().contains("150 words"));
    }
}
