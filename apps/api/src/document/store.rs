//! Draft persistence. Only HTTP handlers call into this module; the pipeline
//! itself works on plain values.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::document::model::DocumentModel;
use crate::errors::AppError;
use crate::render::TemplateId;

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub model: Value,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted draft with its model decoded.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub id: Uuid,
    pub model: DocumentModel,
    pub template: TemplateId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = anyhow::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let model: DocumentModel = serde_json::from_value(row.model)
            .with_context(|| format!("stored model for document {} is invalid", row.id))?;
        let template: TemplateId = row
            .template
            .parse()
            .with_context(|| format!("stored template for document {} is invalid", row.id))?;
        Ok(StoredDocument {
            id: row.id,
            model,
            template,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn encode(model: &DocumentModel) -> Result<Value, AppError> {
    Ok(serde_json::to_value(model).context("failed to encode document model")?)
}

pub async fn insert_document(
    pool: &PgPool,
    model: &DocumentModel,
    template: TemplateId,
) -> Result<StoredDocument, AppError> {
    let row: DocumentRow = sqlx::query_as(
        r#"
        INSERT INTO documents (id, model, template)
        VALUES ($1, $2, $3)
        RETURNING id, model, template, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(encode(model)?)
    .bind(template.as_str())
    .fetch_one(pool)
    .await?;

    info!("Stored document {} ({})", row.id, template);
    Ok(StoredDocument::try_from(row)?)
}

pub async fn get_document(pool: &PgPool, id: Uuid) -> Result<StoredDocument, AppError> {
    let row: Option<DocumentRow> = sqlx::query_as(
        "SELECT id, model, template, created_at, updated_at FROM documents WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("document {id}")))?;
    Ok(StoredDocument::try_from(row)?)
}

/// Replaces the stored model of an existing draft.
pub async fn update_model(
    pool: &PgPool,
    id: Uuid,
    model: &DocumentModel,
) -> Result<StoredDocument, AppError> {
    let row: Option<DocumentRow> = sqlx::query_as(
        r#"
        UPDATE documents SET model = $2, updated_at = now()
        WHERE id = $1
        RETURNING id, model, template, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(encode(model)?)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("document {id}")))?;
    Ok(StoredDocument::try_from(row)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::Profile;

    fn row(model: Value, template: &str) -> DocumentRow {
        DocumentRow {
            id: Uuid::nil(),
            model,
            template: template.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_decodes_into_stored_document() {
        let model = DocumentModel::new(
            Profile {
                name: "Jane Doe".to_string(),
                ..Profile::default()
            },
            None,
        );
        let stored = StoredDocument::try_from(row(encode(&model).unwrap(), "cover-letter")).unwrap();
        assert_eq!(stored.model, model);
        assert_eq!(stored.template, TemplateId::CoverLetter);
    }

    #[test]
    fn test_corrupt_row_is_an_error() {
        assert!(StoredDocument::try_from(row(serde_json::json!({"nope": 1}), "resume")).is_err());
        let model = serde_json::json!({"profile": {"name": "Jane Doe"}});
        assert!(StoredDocument::try_from(row(model, "brochure")).is_err());
    }
}
