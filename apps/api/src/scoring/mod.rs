//! ATS scoring: how well a document covers the vocabulary of a job description,
//! plus rule-based hints for common resume gaps.
//!
//! Pure keyword counting. Deterministic and no generation call.

pub mod handlers;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::model::{DocumentModel, SectionKind};
use crate::errors::{FieldIssue, ValidationError};

/// Words this short never count as keywords.
const MIN_KEYWORD_CHARS: usize = 3;

const WEAK_VERBS: &[&str] = &["helped", "tried", "hoped", "wanted", "needed", "worked on"];
const STRONG_VERBS: &[&str] = &[
    "achieved",
    "managed",
    "created",
    "designed",
    "developed",
    "implemented",
    "improved",
    "increased",
    "led",
    "optimized",
];

/// Sections a reviewer expects, with the name used in hints.
const EXPECTED_SECTIONS: [(SectionKind, &str); 4] = [
    (SectionKind::Experience, "Work Experience"),
    (SectionKind::Education, "Education"),
    (SectionKind::Skills, "Skills"),
    (SectionKind::Projects, "Projects"),
];

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    /// Occurrences in the document.
    pub count: u32,
    /// Occurrences in the job description.
    pub expected: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    /// 0 – 100, one decimal place.
    pub score: f64,
    pub matches: BTreeMap<String, KeywordMatch>,
    /// Job keywords absent from the document, in order of first appearance.
    pub missing_keywords: Vec<String>,
    /// Keyword occurrences in the job description.
    pub total_keywords: u32,
    pub suggestions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Keywords
// ────────────────────────────────────────────────────────────────────────────

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Lowercased keyword frequencies, in order of first appearance.
pub fn extract_keywords(text: &str) -> Vec<(String, u32)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u32)> = Vec::new();
    for word in words(text).filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS) {
        match index.get(&word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word.clone(), counts.len());
                counts.push((word, 1));
            }
        }
    }
    counts
}

/// Everything a reader of the document would see: name, contact line,
/// section headings and content.
pub fn document_text(doc: &DocumentModel) -> String {
    let mut parts = vec![doc.profile.name.clone()];
    parts.extend(doc.profile.contact_parts().into_iter().map(str::to_string));
    for section in doc.sections() {
        parts.push(section.title().to_string());
        parts.push(section.text());
    }
    parts.join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores `doc` against `job_description`.
///
/// Each job keyword contributes at most as many hits as it appears in the job
/// description, so repeating one word cannot saturate the score.
pub fn score(doc: &DocumentModel, job_description: &str) -> Result<AtsReport, ValidationError> {
    if job_description.trim().is_empty() {
        return Err(ValidationError::single(FieldIssue::required("job_description")));
    }

    let text = document_text(doc);
    let resume: HashMap<String, u32> = extract_keywords(&text).into_iter().collect();
    let job = extract_keywords(job_description);

    let total_keywords: u32 = job.iter().map(|(_, n)| n).sum();
    let mut matches = BTreeMap::new();
    let mut missing_keywords = Vec::new();
    let mut hits = 0_u32;

    for (keyword, expected) in job {
        match resume.get(&keyword) {
            Some(&count) => {
                hits += count.min(expected);
                matches.insert(keyword, KeywordMatch { count, expected });
            }
            None => missing_keywords.push(keyword),
        }
    }

    let score = if total_keywords == 0 {
        0.0
    } else {
        let raw = (f64::from(hits) / f64::from(total_keywords) * 100.0).min(100.0);
        (raw * 10.0).round() / 10.0
    };

    info!(
        "ATS score {score} ({} of {} job keywords matched)",
        matches.len(),
        matches.len() + missing_keywords.len()
    );

    Ok(AtsReport {
        score,
        matches,
        missing_keywords,
        total_keywords,
        suggestions: suggestions(doc, &text),
    })
}

/// True if `phrase` occurs as a run of whole words in `tokens`.
fn has_phrase(tokens: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').collect();
    tokens
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(a, b)| a == b))
}

/// Rule-based hints, independent of the job description.
pub fn suggestions(doc: &DocumentModel, text: &str) -> Vec<String> {
    let mut out = Vec::new();

    if doc.profile.contact_parts().is_empty() {
        out.push("Add contact information (phone, email, LinkedIn)".to_string());
    }

    for (kind, name) in EXPECTED_SECTIONS {
        let present = doc.section(kind).is_some_and(|s| !s.entries.is_empty());
        if !present {
            out.push(format!("Consider adding a '{name}' section"));
        }
    }

    let tokens: Vec<String> = words(text).collect();
    let weak = WEAK_VERBS.iter().any(|v| has_phrase(&tokens, v));
    let strong = STRONG_VERBS.iter().any(|v| has_phrase(&tokens, v));
    if weak && !strong {
        out.push("Use more action verbs to describe your experience".to_string());
    }

    out
}
