//! AI Content Augmenter — fans out one generation call per selected section.
//!
//! Flow: plan (validate selection, snapshot section text) → bounded fan-out →
//! collect every outcome → `AugmentationBatch` in selection order.
//!
//! Nothing is merged here. A section whose call fails is recorded as
//! `Augmentation::Failed` and the rest of the batch carries on.
//!
//! Cancellation: the spawned calls live in a `JoinSet` owned by the `augment`
//! future. Dropping that future aborts every in-flight call; none is retried.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::augment::prompts::{
    BULLETS_PROMPT_TEMPLATE, KEEP_LENGTH_RULE, PROSE_PROMPT_TEMPLATE, PROSE_SYSTEM,
};
use crate::augment::style::{LetterLength, Style};
use crate::document::builder::split_paragraphs;
use crate::document::model::{DocumentModel, SectionKind};
use crate::errors::{FieldIssue, ValidationError};
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{parse_json_reply, LlmError, TextGenerator};

// ────────────────────────────────────────────────────────────────────────────
// Configuration and options
// ────────────────────────────────────────────────────────────────────────────

/// Worker limits for a batch.
#[derive(Debug, Clone)]
pub struct AugmentConfig {
    /// Upper bound for a single section's generation call.
    pub timeout: Duration,
    /// Maximum number of calls in flight at once.
    pub concurrency: usize,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            concurrency: 4,
        }
    }
}

/// Which sections to rewrite and in what style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AugmentOptions {
    pub sections: Vec<SectionKind>,
    #[serde(default)]
    pub style: Style,
    /// Applies to the letter section only.
    #[serde(default)]
    pub letter_length: LetterLength,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// One section's snapshot, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationRequest {
    pub section: SectionKind,
    pub text: String,
    pub style: Style,
    /// Number of records for record sections; `None` for prose sections.
    pub record_count: Option<usize>,
    /// Requested length; set for the letter section only.
    pub length: Option<LetterLength>,
}

/// Suggested replacement content for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Suggestion {
    /// Replacement paragraphs for a prose section.
    Paragraphs(Vec<String>),
    /// Replacement bullets, one list per record, in record order.
    Bullets(Vec<Vec<String>>),
}

/// Why one section's call produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AugmentationError {
    #[error("timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    #[error("empty response")]
    Empty,
}

impl From<LlmError> for AugmentationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => AugmentationError::Transport {
                message: e.to_string(),
            },
            LlmError::Api { status, message } => AugmentationError::Api { status, message },
            LlmError::Parse(e) => AugmentationError::Malformed {
                reason: e.to_string(),
            },
            LlmError::RateLimited { retries } => AugmentationError::Api {
                status: 429,
                message: format!("rate limited after {retries} retries"),
            },
            LlmError::EmptyContent => AugmentationError::Empty,
            LlmError::Timeout(d) => AugmentationError::Timeout {
                millis: d.as_millis() as u64,
            },
        }
    }
}

/// Per-section state. A suggestion starts `Pending`, becomes `Accepted` only
/// through `AugmentationBatch::accept`, and only `Accepted` ones are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Augmentation {
    Pending(Suggestion),
    Accepted(Suggestion),
    Failed(AugmentationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAugmentation {
    pub section: SectionKind,
    pub outcome: Augmentation,
}

/// All outcomes of one augmentation run, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationBatch {
    pub sections: Vec<SectionAugmentation>,
}

impl AugmentationBatch {
    pub fn get(&self, section: SectionKind) -> Option<&Augmentation> {
        self.sections
            .iter()
            .find(|s| s.section == section)
            .map(|s| &s.outcome)
    }

    /// Sections whose call failed, with the reason.
    pub fn failures(&self) -> Vec<(SectionKind, &AugmentationError)> {
        self.sections
            .iter()
            .filter_map(|s| match &s.outcome {
                Augmentation::Failed(e) => Some((s.section, e)),
                _ => None,
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

/// Validates the selection against the document and snapshots each section.
///
/// Duplicates in the selection are collapsed, keeping first-occurrence order.
pub fn plan(
    doc: &DocumentModel,
    options: &AugmentOptions,
) -> Result<Vec<AugmentationRequest>, ValidationError> {
    let mut issues = Vec::new();
    let mut requests: Vec<AugmentationRequest> = Vec::new();

    if options.sections.is_empty() {
        issues.push(FieldIssue::new("sections", "select at least one section to augment"));
    }

    for &kind in &options.sections {
        if requests.iter().any(|r| r.section == kind) {
            continue;
        }
        if matches!(kind, SectionKind::Skills | SectionKind::Certifications) {
            issues.push(FieldIssue::new(
                "sections",
                format!("section '{}' cannot be augmented", kind.title()),
            ));
            continue;
        }
        let Some(section) = doc.section(kind) else {
            issues.push(FieldIssue::new(
                "sections",
                format!("section '{}' is not in the document", kind.title()),
            ));
            continue;
        };
        if section.entries.is_empty() {
            issues.push(FieldIssue::new(
                "sections",
                format!("section '{}' has no content to augment", kind.title()),
            ));
            continue;
        }
        requests.push(AugmentationRequest {
            section: kind,
            text: section.text(),
            style: options.style,
            record_count: kind.holds_records().then(|| section.records().count()),
            length: (kind == SectionKind::Letter).then_some(options.letter_length),
        });
    }

    if issues.is_empty() {
        Ok(requests)
    } else {
        Err(ValidationError { issues })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fan-out
// ────────────────────────────────────────────────────────────────────────────

/// Runs one generation call per selected section with at most
/// `config.concurrency` in flight, and returns once every call has finished
/// or timed out.
pub async fn augment(
    doc: &DocumentModel,
    options: &AugmentOptions,
    generator: Arc<dyn TextGenerator>,
    config: &AugmentConfig,
) -> Result<AugmentationBatch, ValidationError> {
    let requests = plan(doc, options)?;
    let sections: Vec<SectionKind> = requests.iter().map(|r| r.section).collect();

    info!(
        "Augmenting {} sections (concurrency {}, style {})",
        requests.len(),
        config.concurrency,
        options.style
    );

    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, request) in requests.into_iter().enumerate() {
        let generator = Arc::clone(&generator);
        let semaphore = Arc::clone(&semaphore);
        let timeout = config.timeout;
        tasks.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => run_one(generator.as_ref(), &request, timeout).await,
                Err(_) => Err(AugmentationError::Transport {
                    message: "worker pool closed".to_string(),
                }),
            };
            (index, outcome)
        });
    }

    // Slots start as failures so a panicked task still leaves a visible outcome.
    let mut outcomes: Vec<Augmentation> = sections
        .iter()
        .map(|_| {
            Augmentation::Failed(AugmentationError::Transport {
                message: "generation task aborted".to_string(),
            })
        })
        .collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(suggestion))) => outcomes[index] = Augmentation::Pending(suggestion),
            Ok((index, Err(e))) => {
                warn!("Augmentation of '{}' failed: {e}", sections[index]);
                outcomes[index] = Augmentation::Failed(e);
            }
            Err(e) => warn!("Augmentation task did not complete: {e}"),
        }
    }

    let batch = AugmentationBatch {
        sections: sections
            .into_iter()
            .zip(outcomes)
            .map(|(section, outcome)| SectionAugmentation { section, outcome })
            .collect(),
    };

    info!(
        "Augmentation finished: {} suggested, {} failed",
        batch.sections.len() - batch.failures().len(),
        batch.failures().len()
    );

    Ok(batch)
}

async fn run_one(
    generator: &dyn TextGenerator,
    request: &AugmentationRequest,
    timeout: Duration,
) -> Result<Suggestion, AugmentationError> {
    let (prompt, system) = build_prompt(request);
    let reply = tokio::time::timeout(timeout, generator.generate(&prompt, system))
        .await
        .map_err(|_| AugmentationError::Timeout {
            millis: timeout.as_millis() as u64,
        })??;
    parse_suggestion(request, &reply)
}

/// Fills the prompt template for a request. Returns `(prompt, system)`.
pub fn build_prompt(request: &AugmentationRequest) -> (String, &'static str) {
    let style = format!("{} ({})", request.style, request.style.guideline());
    match request.record_count {
        Some(count) => (
            BULLETS_PROMPT_TEMPLATE
                .replace("{section_title}", request.section.title())
                .replace("{style}", &style)
                .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
                .replace("{record_count}", &count.to_string())
                .replace("{section_text}", &request.text),
            JSON_ONLY_SYSTEM,
        ),
        None => (
            PROSE_PROMPT_TEMPLATE
                .replace("{section_title}", request.section.title())
                .replace("{style}", &style)
                .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
                .replace(
                    "{length_rule}",
                    request.length.map_or(KEEP_LENGTH_RULE, LetterLength::guideline),
                )
                .replace("{section_text}", &request.text),
            PROSE_SYSTEM,
        ),
    }
}

/// Interprets a raw reply according to the section's shape.
pub fn parse_suggestion(
    request: &AugmentationRequest,
    reply: &str,
) -> Result<Suggestion, AugmentationError> {
    if reply.trim().is_empty() {
        return Err(AugmentationError::Empty);
    }

    match request.record_count {
        Some(expected) => {
            let lists: Vec<Vec<String>> = parse_json_reply(reply)?;
            if lists.len() != expected {
                return Err(AugmentationError::Malformed {
                    reason: format!("expected {expected} bullet lists, got {}", lists.len()),
                });
            }
            Ok(Suggestion::Bullets(
                lists
                    .into_iter()
                    .map(|bullets| {
                        bullets
                            .into_iter()
                            .map(|b| b.trim().to_string())
                            .filter(|b| !b.is_empty())
                            .collect()
                    })
                    .collect(),
            ))
        }
        None => {
            let paragraphs = split_paragraphs(reply);
            if paragraphs.is_empty() {
                return Err(AugmentationError::Empty);
            }
            Ok(Suggestion::Paragraphs(paragraphs))
        }
    }
}
