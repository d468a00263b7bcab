//! Inbound event shapes for the two function entry points.
//!
//! Payloads are tagged variants with explicit required fields, validated
//! at the dispatch boundary. Events that fail to deserialize are skipped
//! with a log line — one bad event never aborts its batch.

use serde::{Deserialize, Serialize};

use crate::types::SprintDetails;

/// Scheduled-event type fired when a sprint's time box closes.
pub const SPRINT_END_EVENT: &str = "sprint-end-event";
/// Scheduled-event type fired at the sprint's temporal midpoint.
pub const MID_SPRINT_ALERT_EVENT: &str = "mid-sprint-alert-event";

/// A work created/updated event delivered to function 1.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkEvent {
    pub payload: WorkEventPayload,
}

/// The two work-event shapes we react to. The sprint lives on the new
/// work for creations and on the old work for updates.
#[derive(Debug, Clone, Deserialize)]
pub enum WorkEventPayload {
    #[serde(rename = "work_created")]
    Created { work: WorkItemRef },
    #[serde(rename = "work_updated")]
    Updated { old_work: WorkItemRef },
}

impl WorkEventPayload {
    /// Extract the sprint referenced by this event, if any.
    pub fn sprint(&self) -> Option<&SprintDetails> {
        match self {
            Self::Created { work } => work.sprint.as_ref(),
            Self::Updated { old_work } => old_work.sprint.as_ref(),
        }
    }
}

/// The slice of a work item function 1 cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemRef {
    #[serde(default)]
    pub sprint: Option<SprintDetails>,
}

/// A scheduled event re-delivered to function 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event_type: String,
    pub payload: ScheduledEventPayload,
}

/// The payload function 1 base64-encoded into the schedule request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEventPayload {
    pub object_id: String,
    #[serde(default)]
    pub name: String,
}
