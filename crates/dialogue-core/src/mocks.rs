//! In-process port implementations for tests, demos and the offline server mode.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use protocol::Intent;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::ports::{ClassifierPort, Notification, NotifierPort, TransferPort};

/// Returns queued intents in order, then `Other` once exhausted.
#[derive(Clone, Default)]
pub struct ScriptedClassifier {
    script: Arc<Mutex<VecDeque<Intent>>>,
    seen: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl ScriptedClassifier {
    pub fn new(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self { script: Arc::new(Mutex::new(intents.into_iter().collect())), seen: Arc::default() }
    }

    /// Every `(utterance, recent_history)` the classifier was asked about.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl ClassifierPort for ScriptedClassifier {
    async fn classify(&self, utterance: &str, recent_history: &[String]) -> Result<Intent> {
        self.seen.lock().push((utterance.to_string(), recent_history.to_vec()));
        Ok(self.script.lock().pop_front().unwrap_or(Intent::Other))
    }
}

/// Always answers the same intent.
#[derive(Clone, Copy)]
pub struct FixedClassifier(pub Intent);

#[async_trait]
impl ClassifierPort for FixedClassifier {
    async fn classify(&self, _utterance: &str, _recent_history: &[String]) -> Result<Intent> {
        Ok(self.0)
    }
}

#[derive(Clone, Copy, Default)]
pub struct FailingClassifier;

#[async_trait]
impl ClassifierPort for FailingClassifier {
    async fn classify(&self, _utterance: &str, _recent_history: &[String]) -> Result<Intent> {
        Err(anyhow!("classifier backend unreachable"))
    }
}

/// Never answers within any sane timeout.
#[derive(Clone, Copy, Default)]
pub struct StalledClassifier;

#[async_trait]
impl ClassifierPort for StalledClassifier {
    async fn classify(&self, _utterance: &str, _recent_history: &[String]) -> Result<Intent> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Intent::Other)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotifierPort for RecordingNotifier {
    async fn send_notification(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

#[derive(Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl NotifierPort for FailingNotifier {
    async fn send_notification(&self, _notification: &Notification) -> Result<()> {
        Err(anyhow!("mail relay rejected the message"))
    }
}

#[derive(Clone, Copy, Default)]
pub struct StalledNotifier;

#[async_trait]
impl NotifierPort for StalledNotifier {
    async fn send_notification(&self, _notification: &Notification) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingTransfer {
    requested: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingTransfer {
    /// `(call_id, destination)` pairs in request order.
    pub fn requested(&self) -> Vec<(String, String)> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl TransferPort for RecordingTransfer {
    async fn request_transfer(&self, call_id: &str, destination: &str) -> Result<()> {
        self.requested.lock().push((call_id.to_string(), destination.to_string()));
        Ok(())
    }
}

#[derive(Clone, Copy, Default)]
pub struct FailingTransfer;

#[async_trait]
impl TransferPort for FailingTransfer {
    async fn request_transfer(&self, _call_id: &str, _destination: &str) -> Result<()> {
        Err(anyhow!("no route to operator"))
    }
}
