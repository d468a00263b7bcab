//! The two function entry points, dispatching inbound event batches.
//!
//! Function 1 reacts to work created/updated events and schedules the
//! sprint-end and mid-sprint events on first sighting of a sprint.
//! Function 2 reacts to those scheduled events when they come back and
//! drives the summary / alert paths.
//!
//! Failures are contained per event: a bad payload or a failed
//! collaborator call is logged and the batch moves on. The net effect of
//! any failure is that no message reaches the channel for that trigger.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use sprintpulse_channels::{mid_sprint_alert_payload, sprint_summary_payload};
use sprintpulse_core::SprintPulseConfig;
use sprintpulse_core::events::{
    MID_SPRINT_ALERT_EVENT, SPRINT_END_EVENT, ScheduledEvent, ScheduledEventPayload, WorkEvent,
};
use sprintpulse_core::traits::{IssueSource, MessageSink};
use sprintpulse_core::types::{Issue, IssueStatus};
use sprintpulse_metrics::{classify, compute_velocity};
use sprintpulse_registry::SprintRegistry;
use sprintpulse_scheduler::EventScheduler;
use sprintpulse_summary::SummaryGenerator;

/// Shared state for both entry points.
pub struct AppState {
    pub config: SprintPulseConfig,
    pub registry: Arc<Mutex<SprintRegistry>>,
    pub scheduler: EventScheduler,
    pub issues: Arc<dyn IssueSource>,
    pub generator: SummaryGenerator,
    pub messages: Arc<dyn MessageSink>,
}

/// Function 1: `POST /events/work` — a batch of work created/updated
/// events. Each event is processed to completion before the next.
pub async fn handle_work_events(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<Vec<Value>>,
) -> Json<Value> {
    let mut scheduled = 0usize;
    let mut skipped = 0usize;

    for raw in batch {
        let event: WorkEvent = match serde_json::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("⚠️ Skipping unrecognized work event: {e}");
                skipped += 1;
                continue;
            }
        };

        let Some(sprint) = event.payload.sprint() else {
            skipped += 1;
            continue;
        };

        // Check-then-insert under one lock hold; presence of the entry
        // is the sole dedup signal against re-scheduling.
        let first_sighting = {
            let mut registry = state.registry.lock().await;
            registry.record_if_unseen(sprint.clone())
        };

        if first_sighting {
            state.scheduler.schedule_sprint_events(sprint).await;
            scheduled += 1;
        } else {
            tracing::debug!("Sprint {} already seen — not rescheduling", sprint.id);
            skipped += 1;
        }
    }

    Json(json!({ "ok": true, "scheduled": scheduled, "skipped": skipped }))
}

/// Function 2: `POST /events/scheduled` — a batch of re-delivered
/// scheduled events, dispatched on their declared event type.
pub async fn handle_scheduled_events(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<Vec<Value>>,
) -> Json<Value> {
    let mut handled = 0usize;
    let mut skipped = 0usize;

    for raw in batch {
        let event: ScheduledEvent = match serde_json::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("⚠️ Skipping unrecognized scheduled event: {e}");
                skipped += 1;
                continue;
            }
        };

        match event.event_type.as_str() {
            SPRINT_END_EVENT => {
                handle_sprint_end(&state, &event.payload).await;
                handled += 1;
            }
            MID_SPRINT_ALERT_EVENT => {
                handle_mid_sprint_alert(&state, &event.payload).await;
                handled += 1;
            }
            other => {
                tracing::warn!("⚠️ Unknown event type '{other}' — skipping");
                skipped += 1;
            }
        }
    }

    Json(json!({ "ok": true, "handled": handled, "skipped": skipped }))
}

/// Sprint-end path: fetch issues, generate the summary, post it.
/// No summary (model failure or unparsable output) means no message.
async fn handle_sprint_end(state: &AppState, payload: &ScheduledEventPayload) {
    let Some(issues) = fetch_issues(state, &payload.object_id).await else {
        return;
    };

    let Some(summary) = state
        .generator
        .generate(&payload.object_id, &payload.name, &issues)
        .await
    else {
        tracing::warn!(
            "⚠️ No summary for sprint {} — skipping notification",
            payload.object_id
        );
        return;
    };

    let message = sprint_summary_payload(&summary);
    post_message(state, &message).await;
}

/// Mid-sprint path: fetch issues, keep the unresolved ones, post the
/// alert with planned/achieved/remaining velocity.
async fn handle_mid_sprint_alert(state: &AppState, payload: &ScheduledEventPayload) {
    let Some(issues) = fetch_issues(state, &payload.object_id).await else {
        return;
    };

    let velocity = compute_velocity(&issues);
    let unresolved: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| classify(issue) != IssueStatus::Closed)
        .collect();

    let message = mid_sprint_alert_payload(
        &unresolved,
        velocity.planned,
        velocity.actual,
        velocity.remaining(),
    );
    post_message(state, &message).await;
}

async fn fetch_issues(state: &AppState, sprint_id: &str) -> Option<Vec<Issue>> {
    match state.issues.list_issues(sprint_id).await {
        Ok(issues) => Some(issues),
        Err(e) => {
            tracing::warn!("⚠️ Issue fetch failed for sprint {sprint_id}: {e}");
            None
        }
    }
}

async fn post_message(state: &AppState, message: &Value) {
    let url = &state.config.slack.webhook_url;
    if let Err(e) = state.messages.post(url, message).await {
        tracing::warn!("⚠️ Webhook post failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sprintpulse_core::error::{Result, SprintPulseError};
    use sprintpulse_core::traits::{ScheduleSink, Summarizer};
    use sprintpulse_core::types::{ScheduleRequest, SprintDetails};
    use std::sync::Mutex as StdMutex;

    struct RecordingSink {
        requests: StdMutex<Vec<ScheduleRequest>>,
    }

    #[async_trait]
    impl ScheduleSink for RecordingSink {
        async fn schedule(&self, request: &ScheduleRequest) -> Result<()> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    struct FakeIssues(std::result::Result<Vec<Issue>, String>);

    #[async_trait]
    impl IssueSource for FakeIssues {
        async fn list_issues(&self, _sprint_id: &str) -> Result<Vec<Issue>> {
            match &self.0 {
                Ok(issues) => Ok(issues.clone()),
                Err(e) => Err(SprintPulseError::Api(e.clone())),
            }
        }
    }

    struct CannedSummarizer(String);

    #[async_trait]
    impl Summarizer for CannedSummarizer {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct RecordingMessages {
        posts: StdMutex<Vec<Value>>,
    }

    #[async_trait]
    impl MessageSink for RecordingMessages {
        async fn post(&self, _webhook_url: &str, payload: &Value) -> Result<()> {
            self.posts.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct Fixture {
        state: Arc<AppState>,
        schedule_sink: Arc<RecordingSink>,
        messages: Arc<RecordingMessages>,
    }

    fn fixture(issues: std::result::Result<Vec<Issue>, String>, completion: &str) -> Fixture {
        let registry = Arc::new(Mutex::new(SprintRegistry::new(24)));
        let schedule_sink = Arc::new(RecordingSink {
            requests: StdMutex::new(vec![]),
        });
        let messages = Arc::new(RecordingMessages {
            posts: StdMutex::new(vec![]),
        });
        let summarizer = Arc::new(CannedSummarizer(completion.to_string()));
        let state = Arc::new(AppState {
            config: SprintPulseConfig::default(),
            registry: registry.clone(),
            scheduler: EventScheduler::new(schedule_sink.clone(), "scheduled-events"),
            issues: Arc::new(FakeIssues(issues)),
            generator: SummaryGenerator::new(summarizer, registry),
            messages: messages.clone(),
        });
        Fixture {
            state,
            schedule_sink,
            messages,
        }
    }

    fn work_event(kind: &str, sprint_id: &str) -> Value {
        let work_key = if kind == "work_created" {
            "work"
        } else {
            "old_work"
        };
        json!({
            "payload": {
                (kind): {
                    (work_key): {
                        "sprint": {
                            "id": sprint_id,
                            "name": format!("Sprint {sprint_id}"),
                            "start_date": "2024-11-01T00:00:00Z",
                            "end_date": "2024-11-15T00:00:00Z"
                        }
                    }
                }
            }
        })
    }

    fn issue(display_id: &str, priority: &str, stage: &str) -> Issue {
        Issue {
            display_id: display_id.into(),
            title: "task".into(),
            stage: stage.into(),
            priority: priority.into(),
            owner: String::new(),
            actual_start_date: None,
            actual_close_date: None,
            sprint: Some(SprintDetails {
                id: "S1".into(),
                name: "Sprint S1".into(),
                start_date: "2024-11-01T00:00:00Z".into(),
                end_date: "2024-11-15T00:00:00Z".into(),
            }),
            blocked_tag: false,
            body: None,
        }
    }

    fn narrative() -> String {
        json!({
            "whatWentWell": "• Good",
            "whatWentWrong": "• Bad",
            "retrospectiveInsights": "• Insight",
            "comparisonWithPreviousSprints": {
                "velocityTrend": "up",
                "issueCompletionTrend": "steady",
                "blockerTrend": "down",
                "recommendations": "continue"
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn first_sighting_schedules_two_events() {
        let fx = fixture(Ok(vec![]), "");
        let batch = vec![work_event("work_created", "S1")];
        handle_work_events(State(fx.state.clone()), Json(batch)).await;

        let requests = fx.schedule_sink.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let keys: Vec<&str> = requests.iter().map(|r| r.event_key.as_str()).collect();
        assert!(keys.contains(&"delayed-run-S1"));
        assert!(keys.contains(&"mid-sprint-alert-S1"));
    }

    #[tokio::test]
    async fn second_sighting_schedules_nothing() {
        let fx = fixture(Ok(vec![]), "");
        let batch = vec![
            work_event("work_created", "S1"),
            work_event("work_updated", "S1"),
        ];
        handle_work_events(State(fx.state.clone()), Json(batch)).await;
        assert_eq!(fx.schedule_sink.requests.lock().unwrap().len(), 2);

        // A later batch for the same sprint is also deduplicated.
        let batch = vec![work_event("work_updated", "S1")];
        handle_work_events(State(fx.state.clone()), Json(batch)).await;
        assert_eq!(fx.schedule_sink.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sprintless_and_malformed_events_are_skipped() {
        let fx = fixture(Ok(vec![]), "");
        let batch = vec![
            json!({ "payload": { "work_created": { "work": {} } } }),
            json!({ "payload": { "comment_created": {} } }),
            work_event("work_created", "S2"),
        ];
        let Json(response) = handle_work_events(State(fx.state.clone()), Json(batch)).await;
        assert_eq!(response["scheduled"], 1);
        assert_eq!(response["skipped"], 2);
    }

    #[tokio::test]
    async fn sprint_end_posts_summary_message() {
        let issues = vec![
            issue("ISS-1", "P0", "completed"),
            issue("ISS-2", "P1", "in_review"),
        ];
        let fx = fixture(Ok(issues), &narrative());
        let batch = vec![json!({
            "event_type": SPRINT_END_EVENT,
            "payload": { "object_id": "S1", "name": "Sprint S1" }
        })];
        handle_scheduled_events(State(fx.state.clone()), Json(batch)).await;

        let posts = fx.messages.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let text = posts[0].to_string();
        assert!(text.contains("Sprint Overview"));
        assert!(text.contains("Sprint S1"));
    }

    #[tokio::test]
    async fn malformed_model_output_means_no_notification() {
        let fx = fixture(Ok(vec![issue("ISS-1", "P0", "completed")]), "not json at all");
        let batch = vec![json!({
            "event_type": SPRINT_END_EVENT,
            "payload": { "object_id": "S1", "name": "Sprint S1" }
        })];
        handle_scheduled_events(State(fx.state.clone()), Json(batch)).await;
        assert!(fx.messages.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mid_sprint_alert_lists_unresolved_only() {
        let issues = vec![
            issue("ISS-1", "P0", "completed"),
            issue("ISS-2", "P1", "in_review"),
            issue("ISS-3", "P2", "triage"),
        ];
        let fx = fixture(Ok(issues), "");
        let batch = vec![json!({
            "event_type": MID_SPRINT_ALERT_EVENT,
            "payload": { "object_id": "S1", "name": "Sprint S1" }
        })];
        handle_scheduled_events(State(fx.state.clone()), Json(batch)).await;

        let posts = fx.messages.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let text = posts[0].to_string();
        assert!(text.contains("Mid-Sprint Alert"));
        assert!(text.contains("ISS-2"));
        assert!(text.contains("ISS-3"));
        assert!(!text.contains("ISS-1"));
        // planned 8+5+3=16, actual 8, remaining 8.
        assert!(text.contains("*Planned Velocity:*\\n16"));
        assert!(text.contains("*Remaining Velocity Needed:*\\n8"));
    }

    #[tokio::test]
    async fn issue_fetch_failure_posts_nothing_and_batch_continues() {
        let fx = fixture(Err("auth failed".into()), "");
        let batch = vec![
            json!({
                "event_type": MID_SPRINT_ALERT_EVENT,
                "payload": { "object_id": "S1", "name": "Sprint S1" }
            }),
            json!({
                "event_type": "some-other-event",
                "payload": { "object_id": "S1", "name": "Sprint S1" }
            }),
        ];
        let Json(response) =
            handle_scheduled_events(State(fx.state.clone()), Json(batch)).await;
        assert!(fx.messages.posts.lock().unwrap().is_empty());
        assert_eq!(response["handled"], 1);
        assert_eq!(response["skipped"], 1);
    }
}
