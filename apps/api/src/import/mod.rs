//! Resume import — turns an uploaded PDF, DOCX or text resume into a
//! `RawInput` preview the caller can correct and submit to the builder.

pub mod extract;
pub mod handlers;
pub mod prompts;

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::document::builder::{build_document, RawInput};
use crate::errors::FieldIssue;
use crate::import::prompts::STRUCTURE_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{parse_json_reply, LlmError, TextGenerator};

pub use extract::{extract_text, SourceKind};

/// Longest excerpt of resume text sent for structuring.
const MAX_PROMPT_CHARS: usize = 10_000;

#[derive(Debug, Serialize)]
pub struct ImportPreview {
    pub source: SourceKind,
    pub text: String,
    /// Structured fields, when structuring was requested and succeeded.
    pub input: Option<RawInput>,
    /// Builder issues with `input`; empty when it is ready to submit.
    pub issues: Vec<FieldIssue>,
    pub warning: Option<String>,
}

/// Asks the generation service to map resume text onto `RawInput`. The whole
/// call, retries included, is bounded by `timeout`.
pub async fn structure(
    text: &str,
    generator: &dyn TextGenerator,
    timeout: Duration,
) -> Result<RawInput, LlmError> {
    let excerpt: String = text.chars().take(MAX_PROMPT_CHARS).collect();
    let prompt = STRUCTURE_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{resume_text}", &excerpt);
    let reply = tokio::time::timeout(timeout, generator.generate(&prompt, JSON_ONLY_SYSTEM))
        .await
        .map_err(|_| LlmError::Timeout(timeout))??;
    parse_json_reply(&reply)
}

/// Builds the preview for already-extracted text. A structuring failure is
/// reported as a warning; the extracted text is always returned.
pub async fn preview(
    source: SourceKind,
    text: String,
    generator: Option<&dyn TextGenerator>,
    timeout: Duration,
) -> ImportPreview {
    let mut preview = ImportPreview {
        source,
        text,
        input: None,
        issues: Vec::new(),
        warning: None,
    };

    let Some(generator) = generator else {
        return preview;
    };

    match structure(&preview.text, generator, timeout).await {
        Ok(input) => {
            if let Err(err) = build_document(&input) {
                preview.issues = err.issues;
            }
            info!(
                "Structured imported resume ({} experience, {} issues)",
                input.experience.len(),
                preview.issues.len()
            );
            preview.input = Some(input);
        }
        Err(e) => {
            warn!("Resume structuring failed: {e}");
            preview.warning = Some(format!("automatic structuring failed: {e}"));
        }
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::testing::FnGenerator;

    #[tokio::test]
    async fn test_preview_structures_and_validates() {
        let generator = FnGenerator::new(|prompt: &str| {
            assert!(prompt.contains("Jane Doe"));
            Ok(r#"```json
{"name": "Jane Doe", "experience": [{"role": "Engineer", "organization": "Acme"}]}
```"#
                .to_string())
        });
        let result = preview(
            SourceKind::Text,
            "Jane Doe\nEngineer at Acme".to_string(),
            Some(&generator as &dyn TextGenerator),
            Duration::from_secs(60),
        )
        .await;

        let input = result.input.unwrap();
        assert_eq!(input.name.as_deref(), Some("Jane Doe"));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(
            result.issues[0].message,
            "experience[0] requires a start or end date"
        );
        assert!(result.warning.is_none());
    }

    #[tokio::test]
    async fn test_structuring_failure_keeps_text() {
        let generator = FnGenerator::new(|_| Ok("not json at all".to_string()));
        let result = preview(
            SourceKind::Text,
            "Jane Doe".to_string(),
            Some(&generator as &dyn TextGenerator),
            Duration::from_secs(60),
        )
        .await;
        assert!(result.input.is_none());
        assert_eq!(result.text, "Jane Doe");
        assert!(result.warning.unwrap().starts_with("automatic structuring failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_structuring_times_out_with_warning() {
        let generator = FnGenerator::slow(Duration::from_secs(600), |_| Ok("{}".to_string()));
        let result = preview(
            SourceKind::Text,
            "Jane Doe".to_string(),
            Some(&generator as &dyn TextGenerator),
            Duration::from_secs(5),
        )
        .await;
        assert!(result.input.is_none());
        assert_eq!(generator.finished.load(std::sync::atomic::Ordering::SeqCst), 0);
        let warning = result.warning.unwrap();
        assert!(warning.contains("timed out after 5s"), "{warning}");
    }

    #[tokio::test]
    async fn test_preview_without_generator_is_text_only() {
        let result = preview(
            SourceKind::Pdf,
            "Jane Doe".to_string(),
            None,
            Duration::from_secs(60),
        )
        .await;
        assert!(result.input.is_none() && result.warning.is_none());
    }
}
