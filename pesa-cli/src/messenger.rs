//! Delivery channels for low-balance alerts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use pesa_finance::Messenger;

#[derive(Debug, Serialize)]
struct OutgoingAlert<'a> {
    target: &'a str,
    subject: &'a str,
    body: &'a str,
    queued_at_utc: String,
}

impl<'a> OutgoingAlert<'a> {
    fn new(target: &'a str, subject: &'a str, body: &'a str) -> Self {
        Self {
            target,
            subject,
            body,
            queued_at_utc: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Appends each alert as one JSON line, for an external sender to pick up.
pub struct OutboxMessenger {
    path: PathBuf,
}

impl OutboxMessenger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Messenger for OutboxMessenger {
    async fn dispatch(&self, target: &str, subject: &str, body: &str) -> Result<()> {
        let mut line = serde_json::to_string(&OutgoingAlert::new(target, subject, body))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("open {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("append {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }
}

/// POSTs each alert as JSON to a webhook (SMS/email gateway, chat bot, ...).
pub struct WebhookMessenger {
    client: reqwest::Client,
    url: String,
}

impl WebhookMessenger {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Messenger for WebhookMessenger {
    async fn dispatch(&self, target: &str, subject: &str, body: &str) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&OutgoingAlert::new(target, subject, body))
            .send()
            .await
            .with_context(|| format!("POST {}", self.url))?
            .error_for_status()
            .with_context(|| format!("webhook rejected alert: {}", self.url))?;
        Ok(())
    }
}
