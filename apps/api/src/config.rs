use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::augment::AugmentConfig;
use crate::export::ExportConfig;
use crate::llm_client::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::pipeline::PipelineConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ai_api_key: String,
    pub ai_base_url: String,
    pub ai_model: String,
    /// Bound for one generation call, per HTTP attempt and per augmented section.
    pub ai_timeout_secs: u64,
    pub ai_max_retries: u32,
    pub augment_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ai_api_key: require_env("AI_API_KEY")?,
            ai_base_url: std::env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ai_timeout_secs: optional_env("AI_TIMEOUT_SECS", 60)?,
            ai_max_retries: optional_env("AI_MAX_RETRIES", 2)?,
            augment_concurrency: optional_env("AUGMENT_CONCURRENCY", 4)?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            base_url: self.ai_base_url.clone(),
            model: self.ai_model.clone(),
            request_timeout: Duration::from_secs(self.ai_timeout_secs),
            max_retries: self.ai_max_retries,
            ..LlmConfig::new(self.ai_api_key.clone())
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            augment: AugmentConfig {
                timeout: Duration::from_secs(self.ai_timeout_secs),
                concurrency: self.augment_concurrency.max(1),
            },
            export: ExportConfig::default(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/folio".to_string(),
            ai_api_key: "key".to_string(),
            ai_base_url: "http://localhost:9000/v1".to_string(),
            ai_model: "test-model".to_string(),
            ai_timeout_secs: 15,
            ai_max_retries: 1,
            augment_concurrency: 0,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_llm_config_carries_overrides() {
        let llm = config().llm_config();
        assert_eq!(llm.model, "test-model");
        assert_eq!(llm.request_timeout, Duration::from_secs(15));
        assert_eq!(llm.max_retries, 1);
        assert_eq!(llm.api_key, "key");
    }

    #[test]
    fn test_pipeline_config_never_has_zero_workers() {
        let pipeline = config().pipeline_config();
        assert_eq!(pipeline.augment.concurrency, 1);
        assert_eq!(pipeline.augment.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_optional_env_falls_back_to_default() {
        let port: u16 = optional_env("FOLIO_TEST_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(port, 8080);
    }
}
