//! Progress roll-up.
//!
//! A phase contributes the completed share of the task nodes in its detail
//! forest, except that a phase whose own status is `done` contributes 100
//! outright. Project progress is the unweighted mean of phase
//! contributions: a phase with one task and a phase with a hundred tasks
//! count the same. Changing that weighting would rewrite every stored
//! progress number, so it is kept exactly as-is.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tree::{ItemType, TreeNode};

/// Phase lifecycle status, settable independently of task completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    InProgress,
    Blocked,
    Done,
}

impl PhaseStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(PhaseStatus::NotStarted),
            "in_progress" => Some(PhaseStatus::InProgress),
            "blocked" => Some(PhaseStatus::Blocked),
            "done" => Some(PhaseStatus::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::NotStarted => "not_started",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Blocked => "blocked",
            PhaseStatus::Done => "done",
        }
    }
}

/// Counts `(total, completed)` task nodes at any depth. Containers are
/// skipped, their task descendants are not.
pub fn count_tasks(forest: &[TreeNode]) -> (u32, u32) {
    let mut total = 0;
    let mut completed = 0;
    visit(forest, &mut total, &mut completed);
    (total, completed)
}

fn visit(items: &[TreeNode], total: &mut u32, completed: &mut u32) {
    for node in items {
        if node.item_type == ItemType::Task {
            *total += 1;
            if node.completed {
                *completed += 1;
            }
        }
        visit(&node.children, total, completed);
    }
}

/// A single phase's contribution to project progress, 0..=100.
pub fn phase_contribution(status: PhaseStatus, forest: &[TreeNode]) -> i32 {
    if status == PhaseStatus::Done {
        return 100;
    }
    let (total, completed) = count_tasks(forest);
    if total == 0 {
        return 0;
    }
    (100.0 * f64::from(completed) / f64::from(total)).round() as i32
}

/// Unweighted mean of phase contributions, rounded; 0 for no phases.
pub fn project_progress(contributions: &[i32]) -> i32 {
    if contributions.is_empty() {
        return 0;
    }
    let sum: i32 = contributions.iter().sum();
    (f64::from(sum) / contributions.len() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn task(id: i32, completed: bool) -> TreeNode {
        TreeNode::leaf(id, format!("task {id}"), completed, ItemType::Task)
    }

    fn sub_phase(id: i32, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            children,
            ..TreeNode::leaf(id, format!("group {id}"), false, ItemType::SubPhase)
        }
    }

    #[test]
    fn two_of_three_tasks_round_to_67() {
        let forest = vec![task(1, true), task(2, true), task(3, false)];
        assert_eq!(phase_contribution(PhaseStatus::InProgress, &forest), 67);
    }

    #[test]
    fn done_phase_overrides_tasks() {
        let forest: Vec<TreeNode> = (1..=5).map(|id| task(id, false)).collect();
        assert_eq!(phase_contribution(PhaseStatus::Done, &forest), 100);
    }

    #[test]
    fn empty_phase_contributes_zero() {
        assert_eq!(phase_contribution(PhaseStatus::InProgress, &[]), 0);
    }

    #[test]
    fn containers_do_not_count_but_their_tasks_do() {
        let forest = vec![sub_phase(1, vec![task(2, true), task(3, false)])];
        let (total, completed) = count_tasks(&forest);
        assert_eq!((total, completed), (2, 1));
        assert_eq!(phase_contribution(PhaseStatus::InProgress, &forest), 50);
    }

    #[test]
    fn project_progress_is_unweighted_mean() {
        // a two-thirds-done phase plus a finished phase averages to 84
        assert_eq!(project_progress(&[67, 100]), 84);
        // a 1-task phase and a 100-task phase weigh the same
        assert_eq!(project_progress(&[0, 100]), 50);
    }

    #[test]
    fn no_phases_means_zero_progress() {
        assert_eq!(project_progress(&[]), 0);
    }

    #[test]
    fn status_round_trips() {
        for status in [
            PhaseStatus::NotStarted,
            PhaseStatus::InProgress,
            PhaseStatus::Blocked,
            PhaseStatus::Done,
        ] {
            assert_eq!(PhaseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PhaseStatus::parse("finished"), None);
    }
}
