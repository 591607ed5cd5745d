use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use dialogue_core::ports::{Notification, NotificationKind, NotifierPort};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Posts each notification as JSON to a mail relay webhook.
#[derive(Clone)]
pub struct HttpNotifier {
    http: reqwest::Client,
    endpoint: String,
    recipient: Option<String>,
    bearer: Option<String>,
}

#[derive(Serialize)]
struct Payload<'a> {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    kind: NotificationKind,
    subject: &'a str,
    body: &'a str,
    call_id: &'a str,
    metadata: &'a BTreeMap<String, String>,
    received_at: String,
}

impl HttpNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), endpoint: endpoint.into(), recipient: None, bearer: None }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NotifierPort for HttpNotifier {
    async fn send_notification(&self, notification: &Notification) -> Result<()> {
        let payload = Payload {
            id: notification.id.to_string(),
            to: self.recipient.as_deref(),
            kind: notification.kind,
            subject: &notification.subject,
            body: &notification.body,
            call_id: &notification.call_id,
            metadata: &notification.metadata,
            received_at: notification.received_at.to_rfc3339(),
        };

        let mut req = self
            .http
            .post(&self.endpoint)
            .header("Idempotency-Key", notification.id.to_string())
            .json(&payload);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.context("notification relay unreachable")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("notification relay returned {}: {}", status, body);
        }
        debug!(endpoint = %self.endpoint, call_id = %notification.call_id, "notification relayed");
        Ok(())
    }
}
