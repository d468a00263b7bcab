//! Webhook delivery — POSTs a structured message to a Slack-style
//! incoming webhook.

use async_trait::async_trait;

use sprintpulse_core::error::{Result, SprintPulseError};
use sprintpulse_core::traits::MessageSink;

/// HTTP message sink. A non-200 response is an error for the caller to
/// log; nothing here retries.
pub struct WebhookSink {
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WebhookSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for WebhookSink {
    async fn post(&self, webhook_url: &str, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(webhook_url)
            .header("Content-Type", "application/json")
            .json(payload)
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| SprintPulseError::Channel(format!("Webhook send failed: {e}")))?;

        if response.status().is_success() {
            tracing::info!("✅ Message posted to webhook");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(SprintPulseError::Channel(format!(
                "Webhook error {status}: {body}"
            )))
        }
    }
}
