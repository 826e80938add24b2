use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::export::{ExportError, ExportIoError, UnsupportedBlockError};
use crate::render::UnknownTemplateError;

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// One problem with one input field. `message` is self-contained and safe to show
/// to the user as-is (e.g. `"name required"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the common "`field` required" issue.
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{field} required");
        Self { field, message }
    }
}

/// Bad or missing input. Always carries every issue found, never just the first,
/// so the caller can surface all problems at once.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", self.summary())]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(issue: FieldIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Returns true if any issue carries exactly this message.
    pub fn has_message(&self, message: &str) -> bool {
        self.issues.iter().any(|i| i.message == message)
    }

    fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Application error
// ────────────────────────────────────────────────────────────────────────────

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnknownTemplate(#[from] UnknownTemplateError),

    #[error(transparent)]
    UnsupportedBlock(#[from] UnsupportedBlockError),

    #[error(transparent)]
    ExportIo(#[from] ExportIoError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Unsupported(e) => AppError::UnsupportedBlock(e),
            ExportError::Io(e) => AppError::ExportIo(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut issues = None;
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(err) => {
                issues = Some(err.issues.clone());
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            AppError::UnknownTemplate(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_TEMPLATE",
                e.to_string(),
            ),
            AppError::UnsupportedBlock(e) => {
                tracing::error!("Export mapping error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UNSUPPORTED_BLOCK",
                    e.to_string(),
                )
            }
            AppError::ExportIo(e) => {
                tracing::error!("Export I/O error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_IO_ERROR",
                    "The document could not be written; please retry".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(issues) = issues {
            error["issues"] = json!(issues);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_message() {
        let err = ValidationError {
            issues: vec![
                FieldIssue::required("name"),
                FieldIssue::required("experience[0].organization"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "name required; experience[0].organization required"
        );
        assert!(err.has_message("name required"));
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::from(ValidationError::single(FieldIssue::required("name")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_template_maps_to_unprocessable() {
        let err = AppError::from(UnknownTemplateError("brochure".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
