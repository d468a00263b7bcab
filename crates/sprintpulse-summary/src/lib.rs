//! # SprintPulse Summary
//!
//! Orchestrates end-of-sprint summary generation: classifies issues,
//! computes velocity and grade, asks the narrative model for the
//! retrospective text, and persists the assembled summary into the
//! registry's bounded history.
//!
//! Model failures and unparsable output yield "no summary" — nothing is
//! retried and no partial summary is synthesized locally, so downstream
//! notification is skipped entirely rather than degraded.

pub mod prompt;

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;

use sprintpulse_core::traits::Summarizer;
use sprintpulse_core::types::{
    Issue, IssueBreakdown, IssueLine, IssueStatus, SprintSummary, TrendComparison,
};
use sprintpulse_metrics::{classify, compute_velocity, grade};
use sprintpulse_registry::SprintRegistry;

/// Narrative fields as the model emits them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelNarrative {
    #[serde(default)]
    what_went_well: String,
    #[serde(default)]
    what_went_wrong: String,
    #[serde(default)]
    retrospective_insights: String,
    #[serde(default)]
    comparison_with_previous_sprints: TrendComparison,
}

/// Generates sprint summaries and records them in the registry.
pub struct SummaryGenerator {
    summarizer: Arc<dyn Summarizer>,
    registry: Arc<Mutex<SprintRegistry>>,
}

impl SummaryGenerator {
    pub fn new(summarizer: Arc<dyn Summarizer>, registry: Arc<Mutex<SprintRegistry>>) -> Self {
        Self {
            summarizer,
            registry,
        }
    }

    /// Produce a sprint summary from freshly fetched issues.
    ///
    /// Returns `None` when the model call fails or its output cannot be
    /// parsed. On success the summary is saved into the registry before
    /// being returned.
    pub async fn generate(
        &self,
        sprint_id: &str,
        sprint_name: &str,
        issues: &[Issue],
    ) -> Option<SprintSummary> {
        let velocity = compute_velocity(issues);
        let sprint_grade = grade(velocity);

        let history = {
            let registry = self.registry.lock().await;
            registry.recent_summaries()
        };

        let prompt = prompt::build_prompt(sprint_name, issues, velocity, sprint_grade, &history);
        let completion = match self.summarizer.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Summary completion failed for sprint {sprint_id}: {e}");
                return None;
            }
        };

        let narrative = match parse_narrative(&completion) {
            Some(narrative) => narrative,
            None => {
                tracing::warn!("⚠️ Unparsable model output for sprint {sprint_id} — no summary");
                return None;
            }
        };

        // Sprint dates ride on the issues' sprint reference.
        let (start_date, end_date) = issues
            .iter()
            .find_map(|issue| issue.sprint.as_ref())
            .map(|s| (s.start_date.clone(), s.end_date.clone()))
            .unwrap_or_default();

        let counts = count_statuses(issues);
        let summary = SprintSummary {
            sprint_id: sprint_id.to_string(),
            sprint_name: sprint_name.to_string(),
            start_date,
            end_date,
            open_issues: counts[0],
            closed_issues: counts[1],
            in_progress_issues: counts[2],
            blocked_issues: counts[3],
            actual_velocity: velocity.actual,
            planned_velocity: velocity.planned,
            grade: sprint_grade,
            what_went_well: narrative.what_went_well,
            what_went_wrong: narrative.what_went_wrong,
            retrospective_insights: narrative.retrospective_insights,
            issue_breakdown: breakdown(issues),
            comparison: narrative.comparison_with_previous_sprints,
        };

        {
            let mut registry = self.registry.lock().await;
            registry.save_summary(summary.clone());
        }
        tracing::info!("📋 Sprint summary generated for {sprint_id}");
        Some(summary)
    }
}

/// Counts per bucket: [open, closed, in-progress, blocked].
fn count_statuses(issues: &[Issue]) -> [u32; 4] {
    let mut counts = [0u32; 4];
    for issue in issues {
        let slot = match classify(issue) {
            IssueStatus::Open => 0,
            IssueStatus::Closed => 1,
            IssueStatus::InProgress => 2,
            IssueStatus::Blocked => 3,
        };
        counts[slot] += 1;
    }
    counts
}

/// Per-status issue listings, non-empty buckets only.
fn breakdown(issues: &[Issue]) -> Vec<IssueBreakdown> {
    [
        IssueStatus::Closed,
        IssueStatus::InProgress,
        IssueStatus::Blocked,
        IssueStatus::Open,
    ]
    .into_iter()
    .filter_map(|status| {
        let lines: Vec<IssueLine> = issues
            .iter()
            .filter(|issue| classify(issue) == status)
            .map(|issue| IssueLine {
                display_id: issue.display_id.clone(),
                title: issue.title.clone(),
                priority: issue.priority.clone(),
            })
            .collect();
        (!lines.is_empty()).then_some(IssueBreakdown {
            status,
            issues: lines,
        })
    })
    .collect()
}

/// Parse the model's narrative JSON. Strips optional markdown fences;
/// falls back to extracting the outermost brace span before giving up.
fn parse_narrative(response: &str) -> Option<ModelNarrative> {
    let clean = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if let Ok(narrative) = serde_json::from_str(clean) {
        return Some(narrative);
    }
    let start = clean.find('{')?;
    let end = clean.rfind('}')? + 1;
    serde_json::from_str(&clean[start..end]).ok()
}
