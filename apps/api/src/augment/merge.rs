//! Acceptance and merge of augmentation suggestions.
//!
//! A suggestion only reaches the document through two explicit steps:
//! `AugmentationBatch::accept` marks chosen `Pending` suggestions `Accepted`
//! and discards the rest, then `merge` writes the `Accepted` ones in.
//! `merge` validates the whole batch before touching the document, so it
//! either applies everything or nothing. Re-merging the same batch yields
//! the same document.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::augment::augmenter::{Augmentation, AugmentationBatch, SectionAugmentation, Suggestion};
use crate::document::model::{DocumentModel, Entry, SectionKind};
use crate::errors::{FieldIssue, ValidationError};

impl AugmentationBatch {
    /// Accepts the listed sections' suggestions. Suggestions that are not
    /// listed are dropped from the batch, including ones that arrive already
    /// marked `Accepted`; failures are kept for reporting.
    pub fn accept(self, accepted: &[SectionKind]) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();
        for &kind in accepted {
            match self.get(kind) {
                None => issues.push(FieldIssue::new(
                    "accept",
                    format!("section '{}' was not augmented", kind.title()),
                )),
                Some(Augmentation::Failed(_)) => issues.push(FieldIssue::new(
                    "accept",
                    format!(
                        "section '{}' failed to augment and cannot be accepted",
                        kind.title()
                    ),
                )),
                Some(_) => {}
            }
        }
        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }

        let sections = self
            .sections
            .into_iter()
            .filter_map(|entry| {
                let SectionAugmentation { section, outcome } = entry;
                let outcome = match outcome {
                    Augmentation::Pending(s) | Augmentation::Accepted(s) => {
                        if !accepted.contains(&section) {
                            return None;
                        }
                        Augmentation::Accepted(s)
                    }
                    failed @ Augmentation::Failed(_) => failed,
                };
                Some(SectionAugmentation { section, outcome })
            })
            .collect();

        Ok(AugmentationBatch { sections })
    }
}

/// What a merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Sections whose content was replaced.
    pub applied: Vec<SectionKind>,
    /// Sections left untouched because their augmentation failed.
    pub failed: Vec<SectionKind>,
}

/// Writes every `Accepted` suggestion into `doc`. Fails without modifying the
/// document if any accepted suggestion does not fit its section.
pub fn merge(
    doc: &mut DocumentModel,
    batch: &AugmentationBatch,
) -> Result<MergeReport, ValidationError> {
    let mut issues = Vec::new();
    for entry in &batch.sections {
        if let Augmentation::Accepted(suggestion) = &entry.outcome {
            if let Err(message) = check_fits(doc, entry.section, suggestion) {
                issues.push(FieldIssue::new("batch", message));
            }
        }
    }
    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    let mut report = MergeReport::default();
    for entry in &batch.sections {
        match &entry.outcome {
            Augmentation::Accepted(suggestion) => {
                if let Some(section) = doc.section_mut(entry.section) {
                    apply(&mut section.entries, suggestion);
                    report.applied.push(entry.section);
                }
            }
            Augmentation::Failed(_) => report.failed.push(entry.section),
            Augmentation::Pending(_) => {}
        }
    }

    info!(
        "Merged augmentation: applied {:?}, failed {:?}",
        report.applied, report.failed
    );
    Ok(report)
}

fn check_fits(
    doc: &DocumentModel,
    kind: SectionKind,
    suggestion: &Suggestion,
) -> Result<(), String> {
    let section = doc
        .section(kind)
        .ok_or_else(|| format!("section '{}' is not in the document", kind.title()))?;

    match suggestion {
        Suggestion::Bullets(lists) => {
            if !kind.holds_records() {
                return Err(format!(
                    "section '{}' does not hold records; bullet suggestion rejected",
                    kind.title()
                ));
            }
            let records = section.records().count();
            if lists.len() != records {
                return Err(format!(
                    "section '{}' has {records} entries but the suggestion has {}",
                    kind.title(),
                    lists.len()
                ));
            }
        }
        Suggestion::Paragraphs(paragraphs) => {
            if kind.holds_records() {
                return Err(format!(
                    "section '{}' holds records; paragraph suggestion rejected",
                    kind.title()
                ));
            }
            if paragraphs.iter().all(|p| p.trim().is_empty()) {
                return Err(format!("suggestion for '{}' is empty", kind.title()));
            }
        }
    }
    Ok(())
}

fn apply(entries: &mut Vec<Entry>, suggestion: &Suggestion) {
    match suggestion {
        Suggestion::Paragraphs(paragraphs) => {
            *entries = paragraphs
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(|p| Entry::Text(p.to_string()))
                .collect();
        }
        Suggestion::Bullets(lists) => {
            let records = entries.iter_mut().filter_map(|e| match e {
                Entry::Record(r) => Some(r),
                Entry::Text(_) => None,
            });
            for (record, bullets) in records.zip(lists) {
                record.bullets = bullets.clone();
            }
        }
    }
}
