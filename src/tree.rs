//! Phase detail trees.
//!
//! Phase details are stored as flat rows with an optional parent pointer.
//! This module turns those rows into a forest of [`TreeNode`]s and provides
//! the pure structural operations the service mirrors its row mutations
//! with: update a node in place, delete a subtree, append a child. All
//! operations leave their input untouched and return a new forest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

/// Node kind in the detail tree. Containers (`sub_phase`) group tasks and
/// never count toward progress themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Task,
    SubPhase,
}

impl ItemType {
    /// Stored values are free-form strings; anything that isn't a known
    /// container marker is a task, matching the column default.
    pub fn parse(value: &str) -> Self {
        match value {
            "sub_phase" => ItemType::SubPhase,
            _ => ItemType::Task,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Task => "task",
            ItemType::SubPhase => "sub_phase",
        }
    }
}

/// A resolved node in a phase's detail forest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreeNode {
    pub id: i32,
    pub title: String,
    pub completed: bool,
    pub item_type: ItemType,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(id: i32, title: impl Into<String>, completed: bool, item_type: ItemType) -> Self {
        Self {
            id,
            title: title.into(),
            completed,
            item_type,
            children: Vec::new(),
        }
    }
}

/// Flat row shape the builder consumes. Handlers map storage models into
/// this before building.
#[derive(Clone, Debug)]
pub struct FlatRecord {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub title: String,
    pub completed: bool,
    pub item_type: ItemType,
}

/// How mutations treat a missing target id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationPolicy {
    /// Return the forest unchanged when the target does not exist.
    Lenient,
    /// Report [`TreeError::TargetNotFound`] instead.
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("no node with id {0} in forest")]
    TargetNotFound(i32),
}

/// Scalar field changes for [`update_node`]. Absent fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub item_type: Option<ItemType>,
}

/// Builds a forest from flat parent-pointer records.
///
/// A record whose `parent_id` is absent, refers to itself, or refers to an
/// id not present in the input becomes a root (orphan promotion). When the
/// same id appears more than once the last record wins, for both its field
/// values and its placement.
pub fn build_forest(records: &[FlatRecord]) -> Vec<TreeNode> {
    let mut order: Vec<i32> = Vec::with_capacity(records.len());
    let mut latest: HashMap<i32, &FlatRecord> = HashMap::with_capacity(records.len());
    for record in records {
        if latest.insert(record.id, record).is_none() {
            order.push(record.id);
        }
    }

    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    let mut roots: Vec<i32> = Vec::new();
    for id in &order {
        let record = latest[id];
        match record.parent_id {
            None => roots.push(*id),
            Some(parent) if parent == *id => {
                debug!(id = *id, "detail names itself as parent, promoting to root");
                roots.push(*id);
            }
            Some(parent) if latest.contains_key(&parent) => {
                children.entry(parent).or_default().push(*id);
            }
            Some(parent) => {
                debug!(id = *id, parent, "detail parent not in result set, promoting to root");
                roots.push(*id);
            }
        }
    }

    roots
        .iter()
        .map(|id| materialize(*id, &latest, &children))
        .collect()
}

fn materialize(
    id: i32,
    latest: &HashMap<i32, &FlatRecord>,
    children: &HashMap<i32, Vec<i32>>,
) -> TreeNode {
    let record = latest[&id];
    let kids = children
        .get(&id)
        .map(|ids| {
            ids.iter()
                .map(|child| materialize(*child, latest, children))
                .collect()
        })
        .unwrap_or_default();

    TreeNode {
        id: record.id,
        title: record.title.clone(),
        completed: record.completed,
        item_type: record.item_type,
        children: kids,
    }
}

/// Returns a new forest with `changes` merged into the node matching
/// `target`, wherever it sits. Other nodes are carried over untouched.
pub fn update_node(
    forest: &[TreeNode],
    target: i32,
    changes: &NodeChanges,
    policy: MutationPolicy,
) -> Result<Vec<TreeNode>, TreeError> {
    let mut found = false;
    let next = update_in(forest, target, changes, &mut found);
    finish(next, found, target, policy)
}

fn update_in(
    items: &[TreeNode],
    target: i32,
    changes: &NodeChanges,
    found: &mut bool,
) -> Vec<TreeNode> {
    items
        .iter()
        .map(|node| {
            if node.id == target {
                *found = true;
                let mut next = node.clone();
                if let Some(title) = &changes.title {
                    next.title = title.clone();
                }
                if let Some(completed) = changes.completed {
                    next.completed = completed;
                }
                if let Some(item_type) = changes.item_type {
                    next.item_type = item_type;
                }
                next
            } else {
                TreeNode {
                    children: update_in(&node.children, target, changes, found),
                    ..node.clone()
                }
            }
        })
        .collect()
}

/// Returns a new forest without the node matching `target` and without its
/// entire subtree. Grandchildren are not promoted.
pub fn delete_node(
    forest: &[TreeNode],
    target: i32,
    policy: MutationPolicy,
) -> Result<Vec<TreeNode>, TreeError> {
    let mut found = false;
    let next = delete_in(forest, target, &mut found);
    finish(next, found, target, policy)
}

fn delete_in(items: &[TreeNode], target: i32, found: &mut bool) -> Vec<TreeNode> {
    items
        .iter()
        .filter_map(|node| {
            if node.id == target {
                *found = true;
                None
            } else {
                Some(TreeNode {
                    children: delete_in(&node.children, target, found),
                    ..node.clone()
                })
            }
        })
        .collect()
}

/// Returns a new forest with `node` appended to the children of the node
/// matching `parent`.
pub fn add_child(
    forest: &[TreeNode],
    parent: i32,
    node: TreeNode,
    policy: MutationPolicy,
) -> Result<Vec<TreeNode>, TreeError> {
    let mut found = false;
    let next = add_in(forest, parent, &node, &mut found);
    finish(next, found, parent, policy)
}

fn add_in(items: &[TreeNode], parent: i32, node: &TreeNode, found: &mut bool) -> Vec<TreeNode> {
    items
        .iter()
        .map(|candidate| {
            if candidate.id == parent {
                *found = true;
                let mut next = candidate.clone();
                next.children.push(node.clone());
                next
            } else {
                TreeNode {
                    children: add_in(&candidate.children, parent, node, found),
                    ..candidate.clone()
                }
            }
        })
        .collect()
}

fn finish(
    next: Vec<TreeNode>,
    found: bool,
    target: i32,
    policy: MutationPolicy,
) -> Result<Vec<TreeNode>, TreeError> {
    if found || policy == MutationPolicy::Lenient {
        Ok(next)
    } else {
        Err(TreeError::TargetNotFound(target))
    }
}

/// Finds a node anywhere in the forest.
pub fn find_node(forest: &[TreeNode], id: i32) -> Option<&TreeNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(hit) = find_node(&node.children, id) {
            return Some(hit);
        }
    }
    None
}

/// Ids of the node matching `id` plus all of its descendants; empty when
/// the id is absent.
pub fn subtree_ids(forest: &[TreeNode], id: i32) -> Vec<i32> {
    match find_node(forest, id) {
        Some(node) => {
            let mut ids = Vec::new();
            collect_ids(std::slice::from_ref(node), &mut ids);
            ids
        }
        None => Vec::new(),
    }
}

/// All ids in the forest, depth-first.
pub fn flatten_ids(forest: &[TreeNode]) -> Vec<i32> {
    let mut ids = Vec::new();
    collect_ids(forest, &mut ids);
    ids
}

fn collect_ids(items: &[TreeNode], out: &mut Vec<i32>) {
    for node in items {
        out.push(node.id);
        collect_ids(&node.children, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i32, parent_id: Option<i32>, item_type: ItemType) -> FlatRecord {
        FlatRecord {
            id,
            parent_id,
            title: format!("item {id}"),
            completed: false,
            item_type,
        }
    }

    fn sample_forest() -> Vec<TreeNode> {
        // 1 (sub_phase) -> [2, 3], 4 root task
        build_forest(&[
            record(1, None, ItemType::SubPhase),
            record(2, Some(1), ItemType::Task),
            record(3, Some(1), ItemType::Task),
            record(4, None, ItemType::Task),
        ])
    }

    #[test]
    fn build_then_flatten_preserves_id_set() {
        let records = vec![
            record(10, None, ItemType::SubPhase),
            record(11, Some(10), ItemType::Task),
            record(12, Some(11), ItemType::Task),
            record(13, None, ItemType::Task),
            record(14, Some(10), ItemType::SubPhase),
        ];
        let forest = build_forest(&records);
        let mut ids = flatten_ids(&forest);
        ids.sort_unstable();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn orphan_is_promoted_to_root() {
        let forest = build_forest(&[record(1, Some(99), ItemType::Task)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn self_parent_is_promoted_to_root() {
        let forest = build_forest(&[record(7, Some(7), ItemType::Task)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, 7);
    }

    #[test]
    fn duplicate_id_last_record_wins_once() {
        let mut first = record(5, None, ItemType::Task);
        first.title = "first".into();
        let mut second = record(5, None, ItemType::Task);
        second.title = "second".into();
        second.completed = true;

        let forest = build_forest(&[first, second]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].title, "second");
        assert!(forest[0].completed);
    }

    #[test]
    fn nesting_follows_parent_pointers() {
        let forest = sample_forest();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].id, 1);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].id, 2);
        assert_eq!(forest[1].id, 4);
    }

    #[test]
    fn update_touches_only_the_target() {
        let forest = sample_forest();
        let changes = NodeChanges {
            completed: Some(true),
            ..Default::default()
        };
        let next = update_node(&forest, 3, &changes, MutationPolicy::Strict).unwrap();

        assert!(find_node(&next, 3).unwrap().completed);
        // nodes off the path serialize identically before and after
        for id in [2, 4] {
            let before = serde_json::to_string(find_node(&forest, id).unwrap()).unwrap();
            let after = serde_json::to_string(find_node(&next, id).unwrap()).unwrap();
            assert_eq!(before, after);
        }
        // the rebuilt parent keeps its own fields
        let parent = find_node(&next, 1).unwrap();
        assert_eq!(parent.title, "item 1");
        assert_eq!(parent.item_type, ItemType::SubPhase);
        // input untouched
        assert!(!find_node(&forest, 3).unwrap().completed);
    }

    #[test]
    fn update_is_idempotent() {
        let forest = sample_forest();
        let changes = NodeChanges {
            title: Some("renamed".into()),
            completed: Some(true),
            ..Default::default()
        };
        let once = update_node(&forest, 2, &changes, MutationPolicy::Strict).unwrap();
        let twice = update_node(&once, 2, &changes, MutationPolicy::Strict).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn delete_removes_entire_subtree() {
        let forest = sample_forest();
        let next = delete_node(&forest, 1, MutationPolicy::Strict).unwrap();
        let ids = flatten_ids(&next);
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&3));
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn add_child_appends_to_parent() {
        let forest = sample_forest();
        let node = TreeNode::leaf(9, "new task", false, ItemType::Task);
        let next = add_child(&forest, 1, node, MutationPolicy::Strict).unwrap();
        let parent = find_node(&next, 1).unwrap();
        assert_eq!(parent.children.len(), 3);
        assert_eq!(parent.children[2].id, 9);
    }

    #[test]
    fn lenient_missing_target_is_a_no_op() {
        let forest = sample_forest();
        let changes = NodeChanges {
            completed: Some(true),
            ..Default::default()
        };
        let next = update_node(&forest, 42, &changes, MutationPolicy::Lenient).unwrap();
        assert_eq!(next, forest);

        let node = TreeNode::leaf(9, "stray", false, ItemType::Task);
        let next = add_child(&forest, 42, node, MutationPolicy::Lenient).unwrap();
        assert_eq!(next, forest);
    }

    #[test]
    fn strict_missing_target_errors() {
        let forest = sample_forest();
        assert_eq!(
            delete_node(&forest, 42, MutationPolicy::Strict),
            Err(TreeError::TargetNotFound(42))
        );
    }

    #[test]
    fn subtree_ids_cover_descendants() {
        let forest = sample_forest();
        assert_eq!(subtree_ids(&forest, 1), vec![1, 2, 3]);
        assert_eq!(subtree_ids(&forest, 4), vec![4]);
        assert!(subtree_ids(&forest, 42).is_empty());
    }
}
