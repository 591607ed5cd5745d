use anyhow::Result;
use async_trait::async_trait;
use dialogue_core::ports::ClassifierPort;
use protocol::Intent;
use router::{IntentClassifier, KeywordClassifier, LlmClassifier};
use std::time::Duration;
use tracing::{debug, warn};

/// Bridges `router` classifiers onto the core's classifier port.
///
/// The primary classifier (usually the language model) gets `timeout` to
/// answer. A timeout, an error, or an answer below `min_confidence` falls
/// back to the keyword heuristic, so the core only sees an error when
/// fallback is disabled.
pub struct RouterClassifier {
    primary: Option<Box<dyn IntentClassifier>>,
    fallback: Option<KeywordClassifier>,
    timeout: Duration,
    min_confidence: f32,
}

impl RouterClassifier {
    pub fn new(primary: Box<dyn IntentClassifier>, timeout: Duration) -> Self {
        Self { primary: Some(primary), fallback: Some(KeywordClassifier::new()), timeout, min_confidence: 0.4 }
    }

    /// Keyword matching only, no network.
    pub fn keywords_only() -> Self {
        Self { primary: None, fallback: Some(KeywordClassifier::new()), timeout: Duration::from_secs(1), min_confidence: 0.0 }
    }

    pub fn llm(client: llm::Client, timeout: Duration) -> Self {
        Self::new(Box::new(LlmClassifier::new(client)), timeout)
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn primary_name(&self) -> &str {
        self.primary.as_ref().map(|p| p.name()).unwrap_or("keyword")
    }

    fn fall_back(&self, utterance: &str, history: &[String], cause: anyhow::Error) -> Result<Intent> {
        match &self.fallback {
            Some(keywords) => {
                let verdict = keywords.label(utterance, history);
                debug!(intent = %verdict.intent, cause = %cause, "keyword fallback used");
                Ok(verdict.intent)
            }
            None => Err(cause),
        }
    }
}

#[async_trait]
impl ClassifierPort for RouterClassifier {
    async fn classify(&self, utterance: &str, recent_history: &[String]) -> Result<Intent> {
        let Some(primary) = &self.primary else {
            return self.fall_back(utterance, recent_history, anyhow::anyhow!("no primary classifier"));
        };

        match tokio::time::timeout(self.timeout, primary.classify(utterance, recent_history)).await {
            Ok(Ok(verdict)) if verdict.confidence >= self.min_confidence => {
                debug!(
                    classifier = primary.name(),
                    intent = %verdict.intent,
                    confidence = verdict.confidence,
                    reason = verdict.reason.as_deref().unwrap_or(""),
                    "classified"
                );
                Ok(verdict.intent)
            }
            Ok(Ok(verdict)) => self.fall_back(
                utterance,
                recent_history,
                anyhow::anyhow!("{} answered {} with low confidence {:.2}", primary.name(), verdict.intent, verdict.confidence),
            ),
            Ok(Err(e)) => {
                warn!(classifier = primary.name(), error = %e, "primary classifier failed");
                self.fall_back(utterance, recent_history, e)
            }
            Err(_) => {
                warn!(classifier = primary.name(), timeout_ms = self.timeout.as_millis() as u64, "primary classifier timed out");
                self.fall_back(
                    utterance,
                    recent_history,
                    anyhow::anyhow!("{} timed out after {}ms", primary.name(), self.timeout.as_millis()),
                )
            }
        }
    }
}
