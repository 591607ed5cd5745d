use anyhow::Result;
use async_trait::async_trait;

use crate::types::Classification;

/// Anything that can label an utterance with an intent.
///
/// `history` holds the caller's previous utterances for this call, oldest
/// first, already trimmed to the context window. Implementations may fail;
/// the caller decides what a failure degrades to.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, utterance: &str, history: &[String]) -> Result<Classification>;

    fn name(&self) -> &str;
}

pub trait IntentExtractor {
    /// Pull a classification out of raw model output.
    fn extract(&self, raw: &str) -> Result<Classification>;
}
