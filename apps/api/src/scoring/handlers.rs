use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::document::model::DocumentModel;
use crate::document::store;
use crate::errors::AppError;
use crate::scoring::{score, AtsReport};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub document: DocumentModel,
    pub job_description: String,
}

#[derive(Deserialize)]
pub struct ScoreDraftRequest {
    pub job_description: String,
}

/// POST /api/v1/score
pub async fn handle_score(Json(req): Json<ScoreRequest>) -> Result<Json<AtsReport>, AppError> {
    Ok(Json(score(&req.document, &req.job_description)?))
}

/// POST /api/v1/documents/:id/score
pub async fn handle_score_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScoreDraftRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let stored = store::get_document(&state.db, id).await?;
    Ok(Json(score(&stored.model, &req.job_description)?))
}
