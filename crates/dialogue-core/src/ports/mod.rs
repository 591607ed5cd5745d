pub mod storage;

pub use storage::SessionStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use protocol::Intent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Language-understanding service. May fail or hang; the core bounds and
/// absorbs both.
#[async_trait]
pub trait ClassifierPort: Send + Sync {
    async fn classify(&self, utterance: &str, recent_history: &[String]) -> Result<Intent>;
}

/// Outbound structured message (e-mail in production).
#[async_trait]
pub trait NotifierPort: Send + Sync {
    async fn send_notification(&self, notification: &Notification) -> Result<()>;
}

/// Hands the call to a human. Success means the platform was told to dial.
#[async_trait]
pub trait TransferPort: Send + Sync {
    async fn request_transfer(&self, call_id: &str, destination: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Hours,
    Appointment,
    Problem,
    Message,
}

/// What a notifier delivers. `id` is fresh per send attempt and lets a relay
/// drop duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub call_id: String,
    pub subject: String,
    pub body: String,
    pub metadata: BTreeMap<String, String>,
    pub received_at: DateTime<Utc>,
}
