use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DialogueError;
use crate::ports::{Notification, NotificationKind, NotifierPort, TransferPort};

/// Side effect requested by the policy for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Notify(NotificationRequest),
    Transfer { destination: String },
}

/// Notification content decided by the policy; the executor stamps call id
/// and reception time.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub subject: String,
    pub body: String,
    pub metadata: BTreeMap<String, String>,
}

impl NotificationRequest {
    pub fn new(kind: NotificationKind, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self { kind, subject: subject.into(), body: body.into(), metadata: BTreeMap::new() }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Delivered,
    TransferRequested { destination: String },
    Ended,
    Failed { reason: String },
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. })
    }
}

/// Runs side effects on behalf of the policy. Never propagates an error:
/// failures and timeouts come back as `ActionOutcome::Failed`.
pub struct ActionExecutor<N: NotifierPort, T: TransferPort> {
    notifier: N,
    transfer: T,
    timeout: Duration,
}

impl<N: NotifierPort, T: TransferPort> ActionExecutor<N, T> {
    pub fn new(notifier: N, transfer: T, timeout: Duration) -> Self {
        Self { notifier, transfer, timeout }
    }

    pub async fn execute(&self, call_id: &str, action: &Action) -> ActionOutcome {
        match action {
            Action::Notify(request) => self.send_notification(call_id, request).await,
            Action::Transfer { destination } => self.request_transfer(call_id, destination).await,
        }
    }

    pub async fn send_notification(&self, call_id: &str, request: &NotificationRequest) -> ActionOutcome {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind: request.kind,
            call_id: call_id.to_string(),
            subject: request.subject.clone(),
            body: request.body.clone(),
            metadata: request.metadata.clone(),
            received_at: Utc::now(),
        };

        match tokio::time::timeout(self.timeout, self.notifier.send_notification(&notification)).await {
            Ok(Ok(())) => {
                info!(call_id, id = %notification.id, kind = ?request.kind, subject = %request.subject, "notification sent");
                ActionOutcome::Delivered
            }
            Ok(Err(e)) => failed(call_id, "notification", DialogueError::ActionFailed(format!("{:#}", e))),
            Err(_) => failed(
                call_id,
                "notification",
                DialogueError::ActionFailed(format!("timed out after {}ms", self.timeout.as_millis())),
            ),
        }
    }

    pub async fn request_transfer(&self, call_id: &str, destination: &str) -> ActionOutcome {
        if destination.trim().is_empty() {
            return failed(call_id, "transfer", DialogueError::ActionFailed("no operator number configured".into()));
        }
        match tokio::time::timeout(self.timeout, self.transfer.request_transfer(call_id, destination)).await {
            Ok(Ok(())) => {
                info!(call_id, destination, "transfer requested");
                ActionOutcome::TransferRequested { destination: destination.to_string() }
            }
            Ok(Err(e)) => failed(call_id, "transfer", DialogueError::ActionFailed(format!("{:#}", e))),
            Err(_) => failed(
                call_id,
                "transfer",
                DialogueError::ActionFailed(format!("timed out after {}ms", self.timeout.as_millis())),
            ),
        }
    }

    /// Signals the renderer to hang up. Nothing external to call.
    pub fn terminate(&self, call_id: &str) -> ActionOutcome {
        info!(call_id, "call ended");
        ActionOutcome::Ended
    }
}

fn failed(call_id: &str, what: &str, error: DialogueError) -> ActionOutcome {
    warn!(call_id, action = what, error = %error, "side effect failed");
    ActionOutcome::Failed { reason: error.to_string() }
}
