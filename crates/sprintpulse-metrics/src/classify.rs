//! Issue classification by stage name and blocked tag.

use sprintpulse_core::types::{Issue, IssueStatus};

/// Stages that count as closed.
const CLOSED_STAGES: &[&str] = &["completed", "wont_fix", "duplicate"];
/// Stages that count as in progress.
const IN_PROGRESS_STAGES: &[&str] = &["in_development", "in_review", "in_testing", "in_deployment"];
/// Stages that count as open.
const OPEN_STAGES: &[&str] = &["triage", "backlog", "prioritized"];

/// Classify an issue into one of the four status buckets.
///
/// A "blocked" tag overrides stage-based classification entirely.
/// Stages outside the known sets bucket as Open with a data-quality
/// warning rather than being dropped.
pub fn classify(issue: &Issue) -> IssueStatus {
    if issue.blocked_tag {
        return IssueStatus::Blocked;
    }
    let stage = issue.stage.to_ascii_lowercase();
    if CLOSED_STAGES.contains(&stage.as_str()) {
        IssueStatus::Closed
    } else if IN_PROGRESS_STAGES.contains(&stage.as_str()) {
        IssueStatus::InProgress
    } else if OPEN_STAGES.contains(&stage.as_str()) {
        IssueStatus::Open
    } else {
        tracing::warn!(
            "⚠️ Unclassified stage '{}' on issue {} — bucketing as Open",
            issue.stage,
            issue.display_id
        );
        IssueStatus::Open
    }
}
