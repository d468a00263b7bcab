//! Prompt assembly for the narrative-summary model.

use sprintpulse_core::types::{Issue, SprintGrade, SprintSummary};
use sprintpulse_metrics::Velocity;

/// Build the completion prompt: current metrics, per-issue digests, and
/// comparison data from up to three previous sprints. The model is asked
/// for a single JSON object matching the narrative shape we parse.
pub fn build_prompt(
    sprint_name: &str,
    issues: &[Issue],
    velocity: Velocity,
    grade: SprintGrade,
    history: &[SprintSummary],
) -> String {
    let digests: Vec<serde_json::Value> = issues
        .iter()
        .map(|issue| {
            serde_json::json!({
                "title": issue.title,
                "stage": issue.stage,
                "priority": issue.priority,
                "owner": issue.owner,
                "description": issue
                    .body
                    .as_deref()
                    .unwrap_or("No description provided"),
            })
        })
        .collect();

    let previous: Vec<serde_json::Value> = history
        .iter()
        .map(|s| {
            serde_json::json!({
                "sprint": s.sprint_name,
                "end_date": s.end_date,
                "actual_velocity": s.actual_velocity,
                "planned_velocity": s.planned_velocity,
                "closed_issues": s.closed_issues,
                "blocked_issues": s.blocked_issues,
            })
        })
        .collect();

    format!(
        r#"Please analyze the following sprint tasks and generate a retrospective summary including:
- What went well: tasks or aspects of the sprint that were successful.
- What went wrong: issues or blockers faced during the sprint.
- Retrospective insights: recommendations or actionable insights for future sprints.
- A comparison against the previous sprints listed below.

Sprint: {sprint_name}
Actual velocity: {actual}
Planned velocity: {planned}
Sprint grade: {grade}

Here are the sprint tasks:

{tasks}

Here are the previous sprints for comparison:

{previous}

Provide a structured output in the following JSON format and nothing else (no markdown fences):
{{
  "whatWentWell": string,
  "whatWentWrong": string,
  "retrospectiveInsights": string,
  "comparisonWithPreviousSprints": {{
    "velocityTrend": string,
    "issueCompletionTrend": string,
    "blockerTrend": string,
    "recommendations": string
  }}
}}"#,
        actual = velocity.actual,
        planned = velocity.planned,
        tasks = serde_json::Value::Array(digests),
        previous = serde_json::Value::Array(previous),
    )
}
