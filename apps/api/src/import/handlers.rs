use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;

use crate::errors::{AppError, FieldIssue, ValidationError};
use crate::import::{extract_text, preview, ImportPreview, SourceKind};
use crate::state::AppState;

struct Upload {
    bytes: Bytes,
    file_name: Option<String>,
    content_type: Option<String>,
}

fn invalid(field: &str, message: impl Into<String>) -> AppError {
    ValidationError::single(FieldIssue::new(field, message)).into()
}

/// Treats `"false"`, `"0"` and `"no"` as off; anything else as on.
fn flag(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no")
}

/// POST /api/v1/import
///
/// Multipart form with a `file` part and an optional `structure` flag
/// (default on) controlling the AI structuring pass.
pub async fn handle_import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportPreview>, AppError> {
    let mut upload = None;
    let mut structure = true;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid("file", format!("malformed upload: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| invalid("file", format!("malformed upload: {e}")))?;
                upload = Some(Upload {
                    bytes,
                    file_name,
                    content_type,
                });
            }
            Some("structure") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| invalid("structure", format!("malformed flag: {e}")))?;
                structure = flag(&raw);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| invalid("file", "file required"))?;
    if upload.bytes.is_empty() {
        return Err(invalid("file", "uploaded file is empty"));
    }
    let source = SourceKind::detect(
        &upload.bytes,
        upload.file_name.as_deref(),
        upload.content_type.as_deref(),
    )
    .ok_or_else(|| invalid("file", "unsupported file type (expected PDF, DOCX or plain text)"))?;

    let bytes = upload.bytes;
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, source))
        .await
        .map_err(|e| {
            if e.is_panic() {
                invalid("file", format!("file could not be read as {source:?}"))
            } else {
                AppError::Internal(anyhow::anyhow!("extraction task failed: {e}"))
            }
        })??;

    let generator = structure.then(|| state.llm.as_ref());
    let timeout = state.pipeline.augment.timeout;
    Ok(Json(preview(source, text, generator, timeout).await))
}
