//! # SprintPulse Track
//!
//! HTTP client for the work-tracking platform. Implements two of the
//! core collaborator traits against the platform's REST API:
//! - [`IssueSource`]: `works.list` filtered to a sprint's issues,
//! - [`ScheduleSink`]: `event-sources.schedule` for future event
//!   delivery with an idempotency key.

use async_trait::async_trait;
use serde::Deserialize;

use sprintpulse_core::config::PlatformConfig;
use sprintpulse_core::error::{Result, SprintPulseError};
use sprintpulse_core::traits::{IssueSource, ScheduleSink};
use sprintpulse_core::types::{Issue, ScheduleRequest, SprintDetails};

/// Client for the work-tracking platform API.
pub struct TrackClient {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl TrackClient {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }
}

#[async_trait]
impl IssueSource for TrackClient {
    async fn list_issues(&self, sprint_id: &str) -> Result<Vec<Issue>> {
        let body = serde_json::json!({
            "type": ["issue"],
            "issue.sprint": sprint_id,
        });

        let response = self
            .client
            .post(self.api_url("works.list"))
            .header("authorization", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SprintPulseError::Http(format!("works.list failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SprintPulseError::Api(format!(
                "works.list error {status}: {text}"
            )));
        }

        let body: WorksListResponse = response
            .json()
            .await
            .map_err(|e| SprintPulseError::Api(format!("Invalid works.list response: {e}")))?;

        Ok(body.works.into_iter().map(WireWork::into_issue).collect())
    }
}

#[async_trait]
impl ScheduleSink for TrackClient {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<()> {
        let body = serde_json::json!({
            "id": request.event_source_id,
            "payload": request.payload,
            "event_type": request.event_type,
            "publish_at": request.publish_at.to_rfc3339(),
            "event_key": request.event_key,
        });

        let response = self
            .client
            .post(self.api_url("event-sources.schedule"))
            .header("authorization", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SprintPulseError::Http(format!("schedule failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SprintPulseError::Api(format!(
                "event-sources.schedule error {status}: {text}"
            )));
        }

        tracing::debug!("📨 Schedule request accepted: {}", request.event_key);
        Ok(())
    }
}

/// Wire shape of a `works.list` response.
#[derive(Debug, Deserialize)]
struct WorksListResponse {
    #[serde(default)]
    works: Vec<WireWork>,
}

/// Wire shape of a work item as the platform returns it.
#[derive(Debug, Deserialize)]
struct WireWork {
    #[serde(default)]
    display_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    stage: Option<WireStage>,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    owned_by: Vec<WireOwner>,
    #[serde(default)]
    actual_start_date: Option<String>,
    #[serde(default)]
    actual_close_date: Option<String>,
    #[serde(default)]
    sprint: Option<SprintDetails>,
    #[serde(default)]
    tags: Vec<WireTagEntry>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireStage {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireOwner {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct WireTagEntry {
    #[serde(default)]
    tag: Option<WireTag>,
}

#[derive(Debug, Deserialize)]
struct WireTag {
    #[serde(default)]
    name: String,
}

impl WireWork {
    fn into_issue(self) -> Issue {
        let blocked_tag = self.tags.iter().any(|entry| {
            entry
                .tag
                .as_ref()
                .is_some_and(|t| t.name.eq_ignore_ascii_case("blocked"))
        });
        let owner = self
            .owned_by
            .iter()
            .map(|o| o.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Issue {
            display_id: self.display_id,
            title: self.title,
            stage: self.stage.map(|s| s.name).unwrap_or_default(),
            priority: self.priority,
            owner,
            actual_start_date: self.actual_start_date,
            actual_close_date: self.actual_close_date,
            sprint: self.sprint,
            blocked_tag,
            body: self.body,
        }
    }
}
