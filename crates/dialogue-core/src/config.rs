use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DialogueError, DialogueResult};
use crate::prompts::PromptCatalog;

/// Tunables of the dialogue engine. Everything has a working default; the
/// server overrides fields from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Where transfer requests are dialled.
    pub operator_number: String,
    /// When false, a "yes" to the hours offer sends right away instead of
    /// asking for an address first.
    pub require_email_capture: bool,
    /// Consecutive unusable turns after which the re-prompt offers a human.
    pub max_retries_before_transfer_offer: u32,
    /// Trimmed utterances shorter than this (in characters) count as unusable.
    pub min_utterance_chars: usize,
    /// How many previous utterances the classifier sees.
    pub context_window: usize,
    /// How many utterances a session keeps.
    pub history_capacity: usize,
    pub classifier_timeout_ms: u64,
    pub action_timeout_ms: u64,
    pub prompts: PromptCatalog,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            operator_number: String::new(),
            require_email_capture: true,
            max_retries_before_transfer_offer: 2,
            min_utterance_chars: 2,
            context_window: 3,
            history_capacity: 10,
            classifier_timeout_ms: 4_000,
            action_timeout_ms: 5_000,
            prompts: PromptCatalog::default(),
        }
    }
}

impl PolicyConfig {
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    pub fn with_operator(mut self, number: impl Into<String>) -> Self {
        self.operator_number = number.into();
        self
    }

    pub fn validate(&self) -> DialogueResult<()> {
        if self.operator_number.trim().is_empty() {
            return Err(DialogueError::Config("operator number is not set".into()));
        }
        if self.max_retries_before_transfer_offer == 0 {
            return Err(DialogueError::Config("max_retries_before_transfer_offer must be at least 1".into()));
        }
        if self.context_window > self.history_capacity {
            return Err(DialogueError::Config(format!(
                "context_window ({}) exceeds history_capacity ({})",
                self.context_window, self.history_capacity
            )));
        }
        if self.classifier_timeout_ms == 0 || self.action_timeout_ms == 0 {
            return Err(DialogueError::Config("timeouts must be non-zero".into()));
        }
        Ok(())
    }
}
