//! Collaborator traits — the seams between the core logic and the
//! outside world. Concrete implementations live in `sprintpulse-track`
//! (platform API), `sprintpulse-providers` (LLM), and
//! `sprintpulse-channels` (Slack webhook). Tests substitute fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Issue, ScheduleRequest};

/// Lists the issues attached to a sprint.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn list_issues(&self, sprint_id: &str) -> Result<Vec<Issue>>;
}

/// Accepts schedule requests for future event delivery.
/// The platform guarantees at-most-once delivery per `event_key`.
#[async_trait]
pub trait ScheduleSink: Send + Sync {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<()>;
}

/// Produces a narrative completion for a prompt.
/// The response is expected to be JSON, optionally wrapped in markdown
/// fences; parsing and fallback policy belong to the caller.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Delivers a structured message to a webhook.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post(&self, webhook_url: &str, payload: &serde_json::Value) -> Result<()>;
}
