//! Unified OpenAI-compatible summarizer.
//!
//! A single struct that handles chat completions for all
//! OpenAI-compatible APIs. The response text is returned as-is; JSON
//! parsing and fence stripping belong to the summary generator.

use async_trait::async_trait;
use serde_json::{Value, json};

use sprintpulse_core::config::LlmConfig;
use sprintpulse_core::error::{Result, SprintPulseError};
use sprintpulse_core::traits::Summarizer;

/// Chat-completion client for any OpenAI-compatible API.
pub struct OpenAiCompatibleSummarizer {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatibleSummarizer {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiCompatibleSummarizer {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(SprintPulseError::Provider("API key missing".into()));
        }

        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| SprintPulseError::Http(format!("Connection failed ({url}): {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SprintPulseError::Provider(format!(
                "API error {status}: {text}"
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SprintPulseError::Http(e.to_string()))?;

        let content = json["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| SprintPulseError::Provider("No choices in response".into()))?;

        tracing::debug!("🧠 Completion received ({} chars)", content.len());
        Ok(content.to_string())
    }
}
