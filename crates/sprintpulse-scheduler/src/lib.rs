//! # SprintPulse Scheduler
//!
//! On the first sighting of a sprint, schedules exactly two future
//! events through the platform's event-source API:
//! - a sprint-end event at the sprint's end date,
//! - a mid-sprint alert at the arithmetic midpoint of the time box.
//!
//! Each request carries a deterministic idempotency key derived from the
//! sprint id, so a re-submitted request is applied at most once by the
//! platform. Dedup against repeated work events lives in the registry;
//! this crate only builds and issues the requests.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration, Utc};

use sprintpulse_core::events::{MID_SPRINT_ALERT_EVENT, SPRINT_END_EVENT};
use sprintpulse_core::traits::ScheduleSink;
use sprintpulse_core::types::{ScheduleRequest, SprintDetails, parse_timestamp};

/// Builds and issues schedule requests for newly observed sprints.
pub struct EventScheduler {
    sink: Arc<dyn ScheduleSink>,
    event_source_id: String,
}

impl EventScheduler {
    pub fn new(sink: Arc<dyn ScheduleSink>, event_source_id: impl Into<String>) -> Self {
        Self {
            sink,
            event_source_id: event_source_id.into(),
        }
    }

    /// Schedule both downstream events for a sprint. A failure on one
    /// request is logged and does not prevent the other, nor is it
    /// retried — at-most-once scheduling, not exactly-once.
    pub async fn schedule_sprint_events(&self, sprint: &SprintDetails) {
        let now = Utc::now();
        for request in [
            self.sprint_end_request(sprint, now),
            self.mid_sprint_request(sprint, now),
        ] {
            match self.sink.schedule(&request).await {
                Ok(()) => tracing::info!(
                    "📅 Scheduled {} for sprint {} at {}",
                    request.event_type,
                    sprint.id,
                    request.publish_at.to_rfc3339()
                ),
                Err(e) => tracing::warn!(
                    "⚠️ Failed to schedule {} for sprint {}: {e}",
                    request.event_type,
                    sprint.id
                ),
            }
        }
    }

    /// Request for the sprint-end event, fired at the sprint's end date.
    pub fn sprint_end_request(&self, sprint: &SprintDetails, now: DateTime<Utc>) -> ScheduleRequest {
        let fire_at = parse_timestamp(&sprint.end_date).unwrap_or(now);
        self.build_request(
            sprint,
            SPRINT_END_EVENT,
            fire_at,
            format!("delayed-run-{}", sprint.id),
            now,
        )
    }

    /// Request for the mid-sprint alert, fired at the midpoint between
    /// start and end.
    pub fn mid_sprint_request(&self, sprint: &SprintDetails, now: DateTime<Utc>) -> ScheduleRequest {
        let fire_at = midpoint(sprint).unwrap_or(now);
        self.build_request(
            sprint,
            MID_SPRINT_ALERT_EVENT,
            fire_at,
            format!("mid-sprint-alert-{}", sprint.id),
            now,
        )
    }

    /// Assemble a schedule request. The delay is floored to whole
    /// seconds and the publish timestamp re-derived from it; a fire time
    /// in the past (or a malformed date) yields a non-positive delay and
    /// the request is issued anyway — the platform decides what to do
    /// with an immediate publish.
    fn build_request(
        &self,
        sprint: &SprintDetails,
        event_type: &str,
        fire_at: DateTime<Utc>,
        event_key: String,
        now: DateTime<Utc>,
    ) -> ScheduleRequest {
        let delay_secs = (fire_at - now).num_milliseconds().div_euclid(1000);
        let publish_at = now + Duration::seconds(delay_secs);

        let payload = serde_json::json!({
            "object_id": sprint.id,
            "name": sprint.name,
        });
        let payload = BASE64.encode(payload.to_string());

        ScheduleRequest {
            event_source_id: self.event_source_id.clone(),
            payload,
            event_type: event_type.to_string(),
            publish_at,
            event_key,
        }
    }
}

/// Arithmetic mean of the sprint's start and end timestamps.
/// `None` when either date fails to parse.
fn midpoint(sprint: &SprintDetails) -> Option<DateTime<Utc>> {
    let start = parse_timestamp(&sprint.start_date)?.timestamp_millis();
    let end = parse_timestamp(&sprint.end_date)?.timestamp_millis();
    DateTime::from_timestamp_millis((start + end) / 2)
}
