//! One-shot document pipeline: build → (augment → accept → merge) → render → export.
//!
//! Validation and template lookup both happen before any generation call, so a
//! bad request never costs an external round trip.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::augment::{
    augment, merge, AugmentConfig, AugmentOptions, Augmentation, LetterLength, MergeReport,
    Style,
};
use crate::document::builder::{build_document, RawInput};
use crate::document::model::{DocumentModel, SectionKind};
use crate::errors::AppError;
use crate::export::{export, Artifact, ExportConfig, ExportFormat};
use crate::llm_client::TextGenerator;
use crate::render::renderer::render_template;
use crate::render::TemplateId;

/// Augmentation step of a one-shot build.
#[derive(Debug, Clone, Deserialize)]
pub struct AugmentStep {
    pub sections: Vec<SectionKind>,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub letter_length: LetterLength,
    /// Sections whose suggestions are merged. `None` accepts every section
    /// that produced a suggestion.
    #[serde(default)]
    pub accept: Option<Vec<SectionKind>>,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub template: String,
    pub format: ExportFormat,
    pub augment: Option<AugmentStep>,
}

/// Component configuration for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub augment: AugmentConfig,
    pub export: ExportConfig,
}

#[derive(Debug)]
pub struct BuildOutput {
    pub artifact: Artifact,
    pub document: DocumentModel,
    pub template: TemplateId,
    /// Present when an augmentation step ran.
    pub merge: Option<MergeReport>,
}

impl BuildOutput {
    /// Sections whose augmentation failed and kept their original content.
    pub fn failed_sections(&self) -> &[SectionKind] {
        self.merge
            .as_ref()
            .map(|m| m.failed.as_slice())
            .unwrap_or_default()
    }
}

pub async fn build(
    raw: &RawInput,
    options: &BuildOptions,
    generator: Arc<dyn TextGenerator>,
    config: &PipelineConfig,
) -> Result<BuildOutput, AppError> {
    let mut document = build_document(raw)?;
    let template: TemplateId = options.template.parse()?;

    let merge_report = match &options.augment {
        Some(step) => {
            Some(augment_and_merge(&mut document, step, generator, &config.augment).await?)
        }
        None => None,
    };

    let artifact = render_and_export(&document, template, options.format, &config.export).await?;

    info!(
        "Built {} for '{}' as {} ({} bytes)",
        template,
        document.profile.name,
        options.format,
        artifact.bytes.len()
    );

    Ok(BuildOutput {
        artifact,
        document,
        template,
        merge: merge_report,
    })
}

/// Runs one augmentation batch against `document` and merges the accepted
/// suggestions in place.
pub async fn augment_and_merge(
    document: &mut DocumentModel,
    step: &AugmentStep,
    generator: Arc<dyn TextGenerator>,
    config: &AugmentConfig,
) -> Result<MergeReport, AppError> {
    let options = AugmentOptions {
        sections: step.sections.clone(),
        style: step.style,
        letter_length: step.letter_length,
    };
    let batch = augment(document, &options, generator, config).await?;

    let accepted: Vec<SectionKind> = match &step.accept {
        Some(ids) => ids.clone(),
        None => batch
            .sections
            .iter()
            .filter(|s| !matches!(s.outcome, Augmentation::Failed(_)))
            .map(|s| s.section)
            .collect(),
    };

    let batch = batch.accept(&accepted)?;
    merge(document, &batch).map_err(AppError::from)
}

/// Renders and serializes off the async executor.
pub async fn render_and_export(
    document: &DocumentModel,
    template: TemplateId,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Artifact, AppError> {
    let rendered = render_template(document, template);
    let config = config.clone();
    let artifact = tokio::task::spawn_blocking(move || export(&rendered, format, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export task failed: {e}")))??;
    Ok(artifact)
}
