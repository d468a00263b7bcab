//! Sprint and issue data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sprint identity and time box, as delivered by the work-tracking platform.
///
/// Timestamps are kept in their wire form (RFC 3339 strings). The platform
/// occasionally delivers malformed dates; those degrade to immediate
/// scheduling / skipped pruning at the use sites instead of rejecting the
/// whole event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Parse an RFC 3339 timestamp from the platform. Returns `None` on
/// malformed input rather than failing the caller.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A work item fetched from the platform. Sourced fresh on every fetch;
/// never persisted across invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub display_id: String,
    pub title: String,
    /// Workflow stage name, e.g. `triage`, `in_development`, `completed`.
    pub stage: String,
    /// Priority label, e.g. `P0`..`P3`. Compared case-insensitively.
    pub priority: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub actual_start_date: Option<String>,
    #[serde(default)]
    pub actual_close_date: Option<String>,
    #[serde(default)]
    pub sprint: Option<SprintDetails>,
    /// Whether a "blocked" tag is attached. Overrides stage classification.
    #[serde(default)]
    pub blocked_tag: bool,
    #[serde(default)]
    pub body: Option<String>,
}

/// Classification bucket for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    Closed,
    InProgress,
    Blocked,
}

impl IssueStatus {
    /// Human-readable label, as shown in Slack messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::InProgress => "In Progress",
            Self::Blocked => "Blocked",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sprint grade derived from the actual/planned velocity ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprintGrade {
    Exceptional,
    Good,
    Satisfactory,
    NeedsImprovement,
    Poor,
    /// Planned velocity was zero — no meaningful ratio.
    NotApplicable,
}

impl SprintGrade {
    pub fn label(self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Poor => "Poor",
            Self::NotApplicable => "N/A",
        }
    }
}

impl std::fmt::Display for SprintGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One issue line inside a per-status listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLine {
    pub display_id: String,
    pub title: String,
    pub priority: String,
}

/// Per-status issue listing inside a sprint summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueBreakdown {
    pub status: IssueStatus,
    pub issues: Vec<IssueLine>,
}

/// Trend comparison against recent sprints, narrated by the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendComparison {
    #[serde(default)]
    pub velocity_trend: String,
    #[serde(default)]
    pub issue_completion_trend: String,
    #[serde(default)]
    pub blocker_trend: String,
    #[serde(default)]
    pub recommendations: String,
}

/// Fully derived sprint retrospective. Never mutated after creation;
/// stored once into the summary history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintSummary {
    pub sprint_id: String,
    pub sprint_name: String,
    pub start_date: String,
    pub end_date: String,
    pub open_issues: u32,
    pub closed_issues: u32,
    pub in_progress_issues: u32,
    pub blocked_issues: u32,
    pub actual_velocity: u32,
    pub planned_velocity: u32,
    pub grade: SprintGrade,
    pub what_went_well: String,
    pub what_went_wrong: String,
    pub retrospective_insights: String,
    pub issue_breakdown: Vec<IssueBreakdown>,
    pub comparison: TrendComparison,
}

/// A request to the platform's event-source scheduling API.
/// `event_key` is the idempotency key — the platform guarantees
/// at-most-once delivery per key.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRequest {
    /// Destination event-source id (from config).
    pub event_source_id: String,
    /// Base64-encoded JSON payload re-delivered with the event.
    pub payload: String,
    pub event_type: String,
    pub publish_at: DateTime<Utc>,
    pub event_key: String,
}
