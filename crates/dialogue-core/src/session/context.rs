use chrono::{DateTime, Duration, Utc};
use protocol::Intent;
use serde::{Deserialize, Serialize};

use super::history::UtteranceHistory;
use super::state::DialogueState;

/// Conversation state for one in-progress call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub state: DialogueState,
    pub history: UtteranceHistory,
    /// Free text captured earlier in a branch (the original request), waiting
    /// for its follow-up detail.
    pub pending_subject: Option<String>,
    /// Consecutive turns without a usable utterance.
    pub retry_count: u32,
    pub last_intent: Option<Intent>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub turns: u64,
}

impl Session {
    pub fn new(id: impl Into<String>, history_capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state: DialogueState::Initial,
            history: UtteranceHistory::new(history_capacity),
            pending_subject: None,
            retry_count: 0,
            last_intent: None,
            created_at: now,
            last_activity: now,
            turns: 0,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        now - self.last_activity > max_idle
    }

    pub fn set_pending_subject(&mut self, subject: String) {
        self.pending_subject = Some(subject);
    }

    pub fn clear_pending_subject(&mut self) {
        self.pending_subject = None;
    }

    /// Back to a fresh flow, keeping identity and history.
    pub fn reset_flow(&mut self) {
        self.state = DialogueState::Initial;
        self.pending_subject = None;
        self.retry_count = 0;
        self.last_intent = None;
    }
}
