use crate::models::{Row, HEADER};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

/// Receives the rows appended by a run
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, rows: &[Row]) -> Result<()>;
}

/// Posts new rows as JSON to a webhook
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, rows: &[Row]) -> Result<()> {
        info!("Notifying {} about {} new listings", self.url, rows.len());

        self.client
            .post(&self.url)
            .json(&json!({ "header": HEADER, "rows": rows }))
            .send()
            .await
            .context("Failed to call notification webhook")?
            .error_for_status()
            .context("Notification webhook rejected the request")?;
        Ok(())
    }
}
