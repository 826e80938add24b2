use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::augment::{merge, AugmentOptions, AugmentationBatch, MergeReport};
use crate::document::builder::{build_document, RawInput};
use crate::document::model::{DocumentModel, SectionKind};
use crate::document::store::{self, StoredDocument};
use crate::errors::AppError;
use crate::export::{Artifact, ExportFormat};
use crate::pipeline::{self, AugmentStep, BuildOptions};
use crate::render::{render, RenderedDocument, TemplateId};
use crate::state::AppState;

pub const AUGMENTATION_FAILED_HEADER: &str = "x-augmentation-failed";

fn default_template() -> String {
    TemplateId::Resume.as_str().to_string()
}

fn default_format() -> ExportFormat {
    ExportFormat::Pdf
}

#[derive(Deserialize)]
pub struct BuildRequest {
    pub input: RawInput,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_format")]
    pub format: ExportFormat,
    #[serde(default)]
    pub augment: Option<AugmentStep>,
}

#[derive(Deserialize)]
pub struct CreateDocumentRequest {
    pub input: RawInput,
    #[serde(default = "default_template")]
    pub template: String,
}

#[derive(Deserialize)]
pub struct MergeRequest {
    pub batch: AugmentationBatch,
    pub accept: Vec<SectionKind>,
}

#[derive(Serialize)]
pub struct MergeResponse {
    pub document: StoredDocument,
    pub report: MergeReport,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub template: Option<String>,
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct RenderRequest {
    pub document: DocumentModel,
    #[serde(default = "default_template")]
    pub template: String,
}

/// Lowercase ASCII slug of the profile name, for download file names.
fn file_stem(name: &str, template: TemplateId) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        template.as_str().to_string()
    } else {
        format!("{slug}-{template}")
    }
}

/// Streams an artifact back as a download.
fn artifact_response(artifact: Artifact, stem: &str, failed: &[SectionKind]) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name(stem));
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, artifact.mime_type().to_string())],
        artifact.bytes,
    )
        .into_response();

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if !failed.is_empty() {
        let ids = failed
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",");
        if let Ok(value) = HeaderValue::from_str(&ids) {
            headers.insert(HeaderName::from_static(AUGMENTATION_FAILED_HEADER), value);
        }
    }
    response
}

/// POST /api/v1/documents/build
pub async fn handle_build(
    State(state): State<AppState>,
    Json(req): Json<BuildRequest>,
) -> Result<Response, AppError> {
    let options = BuildOptions {
        template: req.template,
        format: req.format,
        augment: req.augment,
    };
    let output = pipeline::build(&req.input, &options, state.llm.clone(), &state.pipeline).await?;
    let stem = file_stem(&output.document.profile.name, output.template);
    let failed = output.failed_sections().to_vec();
    Ok(artifact_response(output.artifact, &stem, &failed))
}

/// POST /api/v1/documents
pub async fn handle_create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<StoredDocument>), AppError> {
    let model = build_document(&req.input)?;
    let template: TemplateId = req.template.parse()?;
    let stored = store::insert_document(&state.db, &model, template).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredDocument>, AppError> {
    Ok(Json(store::get_document(&state.db, id).await?))
}

/// POST /api/v1/documents/:id/augment
///
/// Returns suggestions only; nothing is written until `/merge`.
pub async fn handle_augment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(options): Json<AugmentOptions>,
) -> Result<Json<AugmentationBatch>, AppError> {
    let stored = store::get_document(&state.db, id).await?;
    let batch = crate::augment::augment(
        &stored.model,
        &options,
        state.llm.clone(),
        &state.pipeline.augment,
    )
    .await?;
    Ok(Json(batch))
}

/// POST /api/v1/documents/:id/merge
pub async fn handle_merge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AppError> {
    let stored = store::get_document(&state.db, id).await?;
    let batch = req.batch.accept(&req.accept)?;

    let mut model = stored.model;
    let report = merge(&mut model, &batch)?;
    let document = store::update_model(&state.db, id, &model).await?;
    Ok(Json(MergeResponse { document, report }))
}

/// GET /api/v1/documents/:id/export?template=&format=
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => default_format(),
    };
    let stored = store::get_document(&state.db, id).await?;
    let template = match query.template.as_deref() {
        Some(raw) => raw.parse::<TemplateId>()?,
        None => stored.template,
    };

    let artifact =
        pipeline::render_and_export(&stored.model, template, format, &state.pipeline.export)
            .await?;
    let stem = file_stem(&stored.model.profile.name, template);
    Ok(artifact_response(artifact, &stem, &[]))
}

/// POST /api/v1/render
pub async fn handle_render(Json(req): Json<RenderRequest>) -> Result<Json<RenderedDocument>, AppError> {
    Ok(Json(render(&req.document, &req.template)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_slugifies_name() {
        assert_eq!(
            file_stem("Jane  O'Doe", TemplateId::CoverLetter),
            "jane-o-doe-cover-letter"
        );
        assert_eq!(file_stem("李雷", TemplateId::Resume), "resume");
    }

    #[test]
    fn test_artifact_response_headers() {
        let artifact = Artifact {
            format: ExportFormat::Markdown,
            bytes: bytes::Bytes::from_static(b"# Jane Doe\n"),
        };
        let response = artifact_response(
            artifact,
            "jane-doe-resume",
            &[SectionKind::Experience, SectionKind::Letter],
        );
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/markdown; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"jane-doe-resume.md\""
        );
        assert_eq!(headers[AUGMENTATION_FAILED_HEADER], "experience,letter");
    }
}
