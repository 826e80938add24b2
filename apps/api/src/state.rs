use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::TextGenerator;
use crate::pipeline::PipelineConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Generation backend. `LlmClient` in production; swapped for doubles in tests.
    pub llm: Arc<dyn TextGenerator>,
    pub pipeline: PipelineConfig,
}
