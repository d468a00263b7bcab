//! Slack Block Kit payload builders.

use serde_json::{Value, json};

use sprintpulse_core::types::{Issue, SprintSummary, parse_timestamp};

/// Priority display order for the mid-sprint alert grouping.
const PRIORITY_ORDER: [&str; 4] = ["p0", "p1", "p2", "p3"];

/// Build the end-of-sprint summary message.
pub fn sprint_summary_payload(summary: &SprintSummary) -> Value {
    let mut blocks = vec![
        header("🚀 Sprint Overview"),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*Sprint Name:*\n{}", summary.sprint_name)),
                mrkdwn(format!("*Start Date:*\n{}", pretty_date(&summary.start_date))),
                mrkdwn(format!("*End Date:*\n{}", pretty_date(&summary.end_date))),
                mrkdwn(format!("*Sprint Velocity (Actual):*\n{}", summary.actual_velocity)),
                mrkdwn(format!("*Planned Velocity:*\n{}", summary.planned_velocity)),
                mrkdwn(format!("*Sprint Grade:*\n{}", summary.grade)),
            ]
        }),
        divider(),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*Closed Issues:*\n{}", summary.closed_issues)),
                mrkdwn(format!("*In-Progress Issues:*\n{}", summary.in_progress_issues)),
                mrkdwn(format!("*Blocked Issues:*\n{}", summary.blocked_issues)),
                mrkdwn(format!("*Open Issues:*\n{}", summary.open_issues)),
            ]
        }),
        divider(),
        header("✨ What Went Well"),
        section(&summary.what_went_well),
        header("⚠️ What Went Wrong"),
        section(&summary.what_went_wrong),
        header("💡 Retrospective Insights"),
        section(&summary.retrospective_insights),
        divider(),
        header("📊 Sprint Comparison (vs. Previous Sprints)"),
        json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*Velocity Trend:* {}", summary.comparison.velocity_trend)),
                mrkdwn(format!(
                    "*Issue Completion Trend:* {}",
                    summary.comparison.issue_completion_trend
                )),
                mrkdwn(format!("*Blocker Trend:* {}", summary.comparison.blocker_trend)),
                mrkdwn(format!("*Recommendations:* {}", summary.comparison.recommendations)),
            ]
        }),
        divider(),
    ];

    for bucket in &summary.issue_breakdown {
        let listing = bucket
            .issues
            .iter()
            .map(|issue| {
                format!(
                    "• {} - {} (Priority: {})",
                    issue.display_id, issue.title, issue.priority
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(json!({
            "type": "section",
            "fields": [
                mrkdwn(format!("*{} Issues:*", bucket.status)),
                mrkdwn(format!("*Total:* {}\n*Issues:*\n{listing}", bucket.issues.len())),
            ]
        }));
    }

    blocks.push(divider());
    blocks.push(section(
        "_P.S. The sprint velocity is calculated as the sum of efforts for completed issues \
         during the sprint. Effort values are assigned based on priority:_\n\n\
         • *P0 (Critical):* 8 effort points\n\
         • *P1 (High Priority):* 5 effort points\n\
         • *P2 (Medium Priority):* 3 effort points\n\
         • *P3 (Low Priority):* 1 effort point",
    ));

    json!({
        "text": "🏁 *Sprint Summary* 🏁",
        "blocks": blocks,
    })
}

/// Build the mid-sprint alert message: unresolved issues grouped by
/// priority, plus planned/achieved/remaining velocity.
pub fn mid_sprint_alert_payload(
    unresolved: &[Issue],
    planned_velocity: u32,
    actual_velocity: u32,
    remaining_velocity: u32,
) -> Value {
    let mut issue_blocks: Vec<Value> = Vec::new();
    for priority in PRIORITY_ORDER {
        let lines: Vec<String> = unresolved
            .iter()
            .filter(|issue| issue.priority.eq_ignore_ascii_case(priority))
            .map(|issue| {
                let stage = if issue.stage.is_empty() {
                    "Unknown"
                } else {
                    issue.stage.as_str()
                };
                format!("{} - {} ({stage})", issue.display_id, issue.title)
            })
            .collect();
        if !lines.is_empty() {
            issue_blocks.push(section(&format!(
                "*Priority {}:*\n{}",
                priority.to_uppercase(),
                lines.join("\n")
            )));
        }
    }

    if issue_blocks.is_empty() {
        issue_blocks.push(section("*None of the issues are open.*"));
    }

    let mut blocks = vec![section(
        ":rotating_light: *Mid-Sprint Alert* :rotating_light:\n\
         The following issues are still in Open state:",
    )];
    blocks.extend(issue_blocks);
    blocks.push(divider());
    blocks.push(json!({
        "type": "section",
        "fields": [
            mrkdwn(format!("*Planned Velocity:*\n{planned_velocity}")),
            mrkdwn(format!("*Velocity Achieved So Far:*\n{actual_velocity}")),
            mrkdwn(format!("*Remaining Velocity Needed:*\n{remaining_velocity}")),
        ]
    }));
    blocks.push(section("Keep pushing to meet the sprint goals! :muscle:"));

    json!({ "blocks": blocks })
}

fn header(text: &str) -> Value {
    json!({
        "type": "header",
        "text": { "type": "plain_text", "text": text }
    })
}

fn section(text: &str) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text }
    })
}

fn mrkdwn(text: String) -> Value {
    json!({ "type": "mrkdwn", "text": text })
}

fn divider() -> Value {
    json!({ "type": "divider" })
}

/// Format a platform timestamp as e.g. "November 15, 2024".
/// Unparsable dates are shown as-is.
fn pretty_date(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintpulse_core::types::{
        IssueBreakdown, IssueLine, IssueStatus, SprintGrade, TrendComparison,
    };

    fn summary() -> SprintSummary {
        SprintSummary {
            sprint_id: "S1".into(),
            sprint_name: "Sprint 1".into(),
            start_date: "2024-11-01T00:00:00Z".into(),
            end_date: "2024-11-15T00:00:00Z".into(),
            open_issues: 1,
            closed_issues: 6,
            in_progress_issues: 2,
            blocked_issues: 1,
            actual_velocity: 36,
            planned_velocity: 44,
            grade: SprintGrade::Good,
            what_went_well: "• Shipped the big thing".into(),
            what_went_wrong: "• Two blockers".into(),
            retrospective_insights: "• Buffer next time".into(),
            issue_breakdown: vec![IssueBreakdown {
                status: IssueStatus::Closed,
                issues: vec![IssueLine {
                    display_id: "ISS-1".into(),
                    title: "Fix UI bug".into(),
                    priority: "P0".into(),
                }],
            }],
            comparison: TrendComparison {
                velocity_trend: "up".into(),
                issue_completion_trend: "steady".into(),
                blocker_trend: "down".into(),
                recommendations: "keep going".into(),
            },
        }
    }

    fn unresolved(display_id: &str, priority: &str, stage: &str) -> Issue {
        Issue {
            display_id: display_id.into(),
            title: "task".into(),
            stage: stage.into(),
            priority: priority.into(),
            owner: String::new(),
            actual_start_date: None,
            actual_close_date: None,
            sprint: None,
            blocked_tag: false,
            body: None,
        }
    }

    #[test]
    fn summary_payload_carries_metrics_and_narrative() {
        let payload = sprint_summary_payload(&summary());
        let text = payload.to_string();
        assert!(text.contains("Sprint 1"));
        assert!(text.contains("November 1, 2024"));
        assert!(text.contains("November 15, 2024"));
        assert!(text.contains("*Sprint Velocity (Actual):*\\n36"));
        assert!(text.contains("*Planned Velocity:*\\n44"));
        assert!(text.contains("Shipped the big thing"));
        assert!(text.contains("ISS-1 - Fix UI bug (Priority: P0)"));
        assert!(text.contains("*Velocity Trend:* up"));
        assert!(text.contains("8 effort points"));
    }

    #[test]
    fn alert_groups_by_priority_in_order() {
        let issues = vec![
            unresolved("ISS-3", "P2", "triage"),
            unresolved("ISS-1", "P0", "in_development"),
            unresolved("ISS-2", "p0", ""),
        ];
        let payload = mid_sprint_alert_payload(&issues, 20, 5, 15);
        let blocks = payload["blocks"].as_array().unwrap();
        // Intro, P0 group, P2 group, divider, velocity, nudge.
        assert_eq!(blocks.len(), 6);
        let p0 = blocks[1]["text"]["text"].as_str().unwrap();
        assert!(p0.starts_with("*Priority P0:*"));
        assert!(p0.contains("ISS-1 - task (in_development)"));
        assert!(p0.contains("ISS-2 - task (Unknown)"));
        let p2 = blocks[2]["text"]["text"].as_str().unwrap();
        assert!(p2.starts_with("*Priority P2:*"));
        assert!(payload.to_string().contains("*Remaining Velocity Needed:*\\n15"));
    }

    #[test]
    fn alert_with_nothing_unresolved_shows_placeholder() {
        let payload = mid_sprint_alert_payload(&[], 10, 10, 0);
        assert!(payload.to_string().contains("None of the issues are open."));
    }
}
