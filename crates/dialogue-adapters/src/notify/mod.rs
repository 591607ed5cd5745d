mod http;
mod log;

pub use http::HttpNotifier;
pub use log::LogNotifier;

use anyhow::Result;
use async_trait::async_trait;
use dialogue_core::ports::{Notification, NotifierPort};

/// Notifier picked at startup from configuration.
pub enum Notifier {
    Http(HttpNotifier),
    Log(LogNotifier),
}

impl Notifier {
    pub fn describe(&self) -> String {
        match self {
            Notifier::Http(n) => format!("http webhook {}", n.endpoint()),
            Notifier::Log(_) => "log only".to_string(),
        }
    }
}

#[async_trait]
impl NotifierPort for Notifier {
    async fn send_notification(&self, notification: &Notification) -> Result<()> {
        match self {
            Notifier::Http(n) => n.send_notification(notification).await,
            Notifier::Log(n) => n.send_notification(notification).await,
        }
    }
}
