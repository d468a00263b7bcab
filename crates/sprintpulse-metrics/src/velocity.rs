//! Effort-weighted sprint velocity and grading.

use sprintpulse_core::types::{Issue, IssueStatus, SprintGrade};

use crate::classify::classify;

/// Planned and actual velocity for a sprint.
///
/// Planned sums effort over all issues; actual sums effort over issues
/// classifying as Closed, with no restriction on when the close
/// happened relative to the sprint window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Velocity {
    pub planned: u32,
    pub actual: u32,
}

impl Velocity {
    /// Effort still outstanding against the plan.
    pub fn remaining(self) -> u32 {
        self.planned.saturating_sub(self.actual)
    }
}

/// Effort points for a priority label. Unmapped priorities carry no
/// effort. Comparison is case-insensitive (`P0` == `p0`).
pub fn effort(priority: &str) -> u32 {
    match priority.to_ascii_lowercase().as_str() {
        "p0" => 8,
        "p1" => 5,
        "p2" => 3,
        "p3" => 1,
        _ => 0,
    }
}

/// Compute planned and actual velocity for a set of issues.
pub fn compute_velocity(issues: &[Issue]) -> Velocity {
    let mut planned = 0;
    let mut actual = 0;
    for issue in issues {
        let points = effort(&issue.priority);
        planned += points;
        if classify(issue) == IssueStatus::Closed {
            actual += points;
        }
    }
    Velocity { planned, actual }
}

/// Grade a sprint from its actual/planned ratio.
/// A plan of zero has no meaningful ratio and grades as N/A.
pub fn grade(velocity: Velocity) -> SprintGrade {
    if velocity.planned == 0 {
        return SprintGrade::NotApplicable;
    }
    let ratio = f64::from(velocity.actual) / f64::from(velocity.planned);
    if ratio >= 0.95 {
        SprintGrade::Exceptional
    } else if ratio >= 0.80 {
        SprintGrade::Good
    } else if ratio >= 0.60 {
        SprintGrade::Satisfactory
    } else if ratio >= 0.40 {
        SprintGrade::NeedsImprovement
    } else {
        SprintGrade::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(priority: &str, stage: &str) -> Issue {
        Issue {
            display_id: "ISS-1".into(),
            title: "test".into(),
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
    fn effort_table() {
        assert_eq!(effort("P0"), 8);
        assert_eq!(effort("p1"), 5);
        assert_eq!(effort("P2"), 3);
        assert_eq!(effort("p3"), 1);
        assert_eq!(effort("P4"), 0);
        assert_eq!(effort(""), 0);
    }

    #[test]
    fn planned_counts_all_actual_counts_closed() {
        // 6 closed of 10: P0×2 + P1×4 closed → actual 2·8 + 4·5 = 36.
        let mut issues = vec![
            issue("P0", "completed"),
            issue("P0", "completed"),
            issue("P1", "completed"),
            issue("P1", "completed"),
            issue("P1", "completed"),
            issue("P1", "completed"),
        ];
        issues.push(issue("P2", "in_review"));
        issues.push(issue("P2", "triage"));
        issues.push(issue("P3", "backlog"));
        issues.push(issue("P3", "in_development"));

        let v = compute_velocity(&issues);
        assert_eq!(v.actual, 36);
        assert_eq!(v.planned, 36 + 3 + 3 + 1 + 1);
        assert_eq!(v.remaining(), 8);
    }

    #[test]
    fn planned_is_order_independent() {
        let mut issues = vec![
            issue("P0", "triage"),
            issue("P1", "completed"),
            issue("P2", "in_review"),
            issue("P3", "backlog"),
        ];
        let forward = compute_velocity(&issues);
        issues.reverse();
        let backward = compute_velocity(&issues);
        assert_eq!(forward, backward);
    }

    #[test]
    fn blocked_closed_issue_earns_no_actual() {
        let mut blocked = issue("P0", "completed");
        blocked.blocked_tag = true;
        let v = compute_velocity(&[blocked]);
        assert_eq!(v.planned, 8);
        assert_eq!(v.actual, 0);
    }

    #[test]
    fn grade_boundaries() {
        // Ratios exactly on each boundary land in the higher bucket.
        let g = |actual, planned| grade(Velocity { planned, actual });
        assert_eq!(g(95, 100), SprintGrade::Exceptional);
        assert_eq!(g(80, 100), SprintGrade::Good);
        assert_eq!(g(60, 100), SprintGrade::Satisfactory);
        assert_eq!(g(40, 100), SprintGrade::NeedsImprovement);
        assert_eq!(g(39, 100), SprintGrade::Poor);
        // 39999/100000 = 0.39999 sits just under the 0.40 boundary.
        assert_eq!(g(39_999, 100_000), SprintGrade::Poor);
    }

    #[test]
    fn zero_plan_grades_not_applicable() {
        assert_eq!(
            grade(Velocity {
                planned: 0,
                actual: 0
            }),
            SprintGrade::NotApplicable
        );
    }
}
