use anyhow::Result;
use async_trait::async_trait;
use dialogue_core::ports::{Notification, NotifierPort};
use tracing::info;

/// Writes notifications to the log. Used when no relay is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotifierPort for LogNotifier {
    async fn send_notification(&self, notification: &Notification) -> Result<()> {
        info!(
            target: "notification",
            call_id = %notification.call_id,
            kind = ?notification.kind,
            subject = %notification.subject,
            metadata = ?notification.metadata,
            "{}",
            notification.body
        );
        Ok(())
    }
}
