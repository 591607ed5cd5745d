use protocol::Intent;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::DialogueError;
use crate::ports::ClassifierPort;

/// Bounds the classifier port in time and absorbs its failures: a turn always
/// gets an intent, `Other` when nothing better is available.
pub struct ClassifierAdapter<C: ClassifierPort> {
    inner: C,
    timeout: Duration,
}

impl<C: ClassifierPort> ClassifierAdapter<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub async fn classify(&self, call_id: &str, utterance: &str, recent_history: &[String]) -> Intent {
        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.inner.classify(utterance, recent_history)).await;

        let error = match result {
            Ok(Ok(intent)) => {
                debug!(call_id, %intent, elapsed_ms = started.elapsed().as_millis() as u64, "utterance classified");
                return intent;
            }
            Ok(Err(e)) => DialogueError::ClassificationUnavailable(format!("{:#}", e)),
            Err(_) => DialogueError::ClassificationUnavailable(format!("timed out after {}ms", self.timeout.as_millis())),
        };
        warn!(call_id, error = %error, "classifier degraded to OTHER");
        Intent::Other
    }
}
