use protocol::Intent;
use serde::{Deserialize, Serialize};

/// A classifier's verdict for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Classification {
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self { intent, confidence, reason: None }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn other(reason: impl Into<String>) -> Self {
        Self::new(Intent::Other, 0.0).with_reason(reason)
    }
}

/// Raw JSON shape the language model is asked to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterResponse {
    pub intent: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// How a caller answered a yes/no offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Affirmative,
    Negative,
    Unclear,
}

/// How a caller answered "transfer now, or leave a message?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoicePreference {
    Transfer,
    Message,
    Unclear,
}
