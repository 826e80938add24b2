//! Shared fixtures for augmentation tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::document::builder::{build_document, RawExperience, RawInput};
use crate::document::model::DocumentModel;
use crate::llm_client::{LlmError, TextGenerator};

/// Jane Doe with a summary, two experience records and a letter. No projects.
pub fn sample_document() -> DocumentModel {
    let raw = RawInput {
        name: Some("Jane Doe".to_string()),
        email: Some("jane@example.com".to_string()),
        summary: Some("Backend engineer.".to_string()),
        experience: vec![
            RawExperience {
                role: Some("Engineer".to_string()),
                organization: Some("Acme".to_string()),
                start: Some("2020".to_string()),
                end: Some("2023".to_string()),
                bullets: vec!["Built billing".to_string()],
                ..RawExperience::default()
            },
            RawExperience {
                role: Some("Intern".to_string()),
                organization: Some("Initech".to_string()),
                start: Some("2019".to_string()),
                ..RawExperience::default()
            },
        ],
        letter: Some("I would love to join.".to_string()),
        ..RawInput::default()
    };
    match build_document(&raw) {
        Ok(doc) => doc,
        Err(e) => panic!("sample document invalid: {e}"),
    }
}

type Reply = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// A generator driven by a closure over the prompt, with optional latency and
/// counters for started, finished and peak concurrent calls.
pub struct FnGenerator {
    reply: Box<Reply>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub started: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
}

impl FnGenerator {
    pub fn new(reply: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            delay: None,
            in_flight: AtomicUsize::new(0),
            started: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn slow(
        delay: Duration,
        reply: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(reply)
        }
    }
}

#[async_trait]
impl TextGenerator for FnGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
        (self.reply)(prompt)
    }
}
