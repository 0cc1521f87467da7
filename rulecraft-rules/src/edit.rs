//! Pure editing operations over rule trees.
//!
//! Nothing here mutates its input: every function returns a new tree and
//! edits below the root rebuild each ancestor on the way back up.

use tracing::debug;

use crate::condition::Condition;
use crate::error::RuleError;
use crate::path::NodePath;
use crate::rule::{Group, GroupKind, RuleNode};

/// Result of removing a child from a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The group without the removed child.
    Updated(Group),
    /// The removed child was the only one; the caller must delete the group
    /// itself from its own parent.
    DeleteGroup,
}

/// Appends an empty condition to the group.
pub fn add_condition(group: &Group) -> Group {
    add_child(group, RuleNode::empty_condition())
}

/// Appends an empty group of `kind` to the group.
pub fn add_group(group: &Group, kind: GroupKind) -> Group {
    add_child(group, RuleNode::empty_group(kind))
}

pub fn add_child(group: &Group, node: RuleNode) -> Group {
    let mut children = group.children().to_vec();
    children.push(node);
    Group::new(group.kind(), children)
}

pub fn replace_child(group: &Group, index: usize, node: RuleNode) -> Result<Group, RuleError> {
    check_index(group, index)?;
    let mut children = group.children().to_vec();
    children[index] = node;
    Ok(Group::new(group.kind(), children))
}

pub fn delete_child(group: &Group, index: usize) -> Result<DeleteOutcome, RuleError> {
    check_index(group, index)?;
    if group.len() == 1 {
        return Ok(DeleteOutcome::DeleteGroup);
    }
    let mut children = group.children().to_vec();
    children.remove(index);
    Ok(DeleteOutcome::Updated(Group::new(group.kind(), children)))
}

/// Promotes a condition into a group whose only child is that condition.
pub fn convert_to_group(condition: &Condition, kind: GroupKind) -> Group {
    Group::new(kind, vec![RuleNode::Condition(condition.clone())])
}

fn check_index(group: &Group, index: usize) -> Result<(), RuleError> {
    if index < group.len() {
        Ok(())
    } else {
        Err(RuleError::IndexOutOfBounds {
            index,
            len: group.len(),
        })
    }
}

/// Replaces the node at `path` with `edit(node)`, rebuilding its ancestors.
pub fn update_at<F>(root: &RuleNode, path: &NodePath, edit: F) -> Result<RuleNode, RuleError>
where
    F: FnOnce(&RuleNode) -> Result<RuleNode, RuleError>,
{
    rebuild(root, path, 0, edit)
}

fn rebuild<F>(
    node: &RuleNode,
    path: &NodePath,
    depth: usize,
    edit: F,
) -> Result<RuleNode, RuleError>
where
    F: FnOnce(&RuleNode) -> Result<RuleNode, RuleError>,
{
    let Some(&index) = path.indices().get(depth) else {
        return edit(node);
    };
    let group = group_at(node, path, depth)?;
    let child = group
        .children()
        .get(index)
        .ok_or(RuleError::IndexOutOfBounds {
            index,
            len: group.len(),
        })?;
    let child = rebuild(child, path, depth + 1, edit)?;
    replace_child(group, index, child).map(RuleNode::Group)
}

/// Removes the node at `path`.
///
/// A group left without children is removed from its parent in turn. When
/// that reaches the root, or `path` is the root, the rule collapses to a
/// single empty condition.
pub fn delete_at(root: &RuleNode, path: &NodePath) -> Result<RuleNode, RuleError> {
    let remaining = if path.is_root() {
        None
    } else {
        delete_in(root, path, 0)?
    };
    Ok(remaining.unwrap_or_else(|| {
        debug!(%path, "rule collapsed to an empty condition");
        RuleNode::empty_condition()
    }))
}

/// `Ok(None)` signals that `node` itself must go.
fn delete_in(
    node: &RuleNode,
    path: &NodePath,
    depth: usize,
) -> Result<Option<RuleNode>, RuleError> {
    let group = group_at(node, path, depth)?;
    let index = path.indices()[depth];

    if depth + 1 < path.indices().len() {
        let child = group
            .children()
            .get(index)
            .ok_or(RuleError::IndexOutOfBounds {
                index,
                len: group.len(),
            })?;
        if let Some(child) = delete_in(child, path, depth + 1)? {
            return replace_child(group, index, child).map(|group| Some(group.into()));
        }
    }

    match delete_child(group, index)? {
        DeleteOutcome::Updated(group) => Ok(Some(group.into())),
        DeleteOutcome::DeleteGroup => Ok(None),
    }
}

fn group_at<'a>(
    node: &'a RuleNode,
    path: &NodePath,
    depth: usize,
) -> Result<&'a Group, RuleError> {
    node.as_group().ok_or_else(|| RuleError::NotAGroup {
        path: NodePath::from(path.indices()[..depth].to_vec()).to_string(),
    })
}

/// Appends an empty condition to the group at `path`.
pub fn add_condition_at(root: &RuleNode, path: &NodePath) -> Result<RuleNode, RuleError> {
    update_group_at(root, path, add_condition)
}

/// Appends an empty group of `kind` to the group at `path`.
pub fn add_group_at(
    root: &RuleNode,
    path: &NodePath,
    kind: GroupKind,
) -> Result<RuleNode, RuleError> {
    update_group_at(root, path, |group| add_group(group, kind))
}

/// Wraps the condition at `path` in a new group of `kind`.
pub fn convert_at(
    root: &RuleNode,
    path: &NodePath,
    kind: GroupKind,
) -> Result<RuleNode, RuleError> {
    update_condition_at(root, path, |condition| Ok(convert_to_group(condition, kind).into()))
}

pub fn update_group_at<F>(
    root: &RuleNode,
    path: &NodePath,
    edit: F,
) -> Result<RuleNode, RuleError>
where
    F: FnOnce(&Group) -> Group,
{
    update_at(root, path, |node| match node {
        RuleNode::Group(group) => Ok(edit(group).into()),
        RuleNode::Condition(_) => Err(RuleError::NotAGroup {
            path: path.to_string(),
        }),
    })
}

pub fn update_condition_at<F>(
    root: &RuleNode,
    path: &NodePath,
    edit: F,
) -> Result<RuleNode, RuleError>
where
    F: FnOnce(&Condition) -> Result<RuleNode, RuleError>,
{
    update_at(root, path, |node| match node {
        RuleNode::Condition(condition) => edit(condition),
        RuleNode::Group(_) => Err(RuleError::NotACondition {
            path: path.to_string(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;

    fn cond(field: &str) -> RuleNode {
        RuleNode::condition(field, Operator::Equals, "v").expect("valid condition")
    }

    fn group(node: &RuleNode) -> &Group {
        node.as_group().expect("group")
    }

    #[test]
    fn add_condition_appends_without_touching_the_input() {
        let original = Group::new(GroupKind::And, vec![cond("a")]);
        let updated = add_condition(&original);

        assert_eq!(original.len(), 1);
        assert_eq!(updated.len(), 2);
        assert_eq!(updated.children()[1], RuleNode::empty_condition());
    }

    #[test]
    fn replace_child_checks_bounds() {
        let original = Group::new(GroupKind::Or, vec![cond("a"), cond("b")]);
        let updated = replace_child(&original, 1, cond("c")).expect("in bounds");
        assert_eq!(updated.children()[1], cond("c"));

        let err = replace_child(&original, 2, cond("c")).unwrap_err();
        assert!(matches!(err, RuleError::IndexOutOfBounds { index: 2, len: 2 }));
    }

    #[test]
    fn deleting_the_last_child_signals_group_deletion() {
        for kind in [GroupKind::And, GroupKind::Or] {
            let single = Group::new(kind, vec![cond("a")]);
            assert_eq!(delete_child(&single, 0).expect("valid"), DeleteOutcome::DeleteGroup);
        }

        let pair = Group::new(GroupKind::And, vec![cond("a"), cond("b")]);
        match delete_child(&pair, 0).expect("valid") {
            DeleteOutcome::Updated(group) => assert_eq!(group.children(), &[cond("b")]),
            DeleteOutcome::DeleteGroup => panic!("group with two children must survive"),
        }
        assert!(delete_child(&pair, 5).is_err());
    }

    #[test]
    fn convert_keeps_the_original_condition() {
        let condition = Condition::new("price", Operator::GreaterThan, "10").expect("valid");
        let group = convert_to_group(&condition, GroupKind::And);

        assert_eq!(group.kind(), GroupKind::And);
        assert_eq!(group.children(), &[RuleNode::Condition(condition)]);
    }

    #[test]
    fn nested_updates_rebuild_ancestors() {
        let root = RuleNode::and(vec![cond("a"), RuleNode::or(vec![cond("b"), cond("c")])]);
        let path = NodePath::from(vec![1, 0]);

        let updated = convert_at(&root, &path, GroupKind::And).expect("convert");
        let converted = updated.get(&path).expect("node");
        assert!(converted.is_and_group());
        assert_eq!(group(converted).children(), &[cond("b")]);
        assert_eq!(root.get(&path), Some(&cond("b")));
    }

    #[test]
    fn path_edits_report_wrong_node_shapes() {
        let root = RuleNode::and(vec![cond("a")]);

        let err = add_condition_at(&root, &NodePath::from(vec![0])).unwrap_err();
        assert!(matches!(err, RuleError::NotAGroup { .. }));

        let err = convert_at(&root, &NodePath::root(), GroupKind::Or).unwrap_err();
        assert!(matches!(err, RuleError::NotACondition { .. }));

        let err =
            update_at(&root, &NodePath::from(vec![0, 1]), |node| Ok(node.clone())).unwrap_err();
        assert!(matches!(err, RuleError::NotAGroup { ref path } if path == "/0"));

        let err = delete_at(&root, &NodePath::from(vec![3])).unwrap_err();
        assert!(matches!(err, RuleError::IndexOutOfBounds { index: 3, len: 1 }));
    }

    #[test]
    fn deletion_propagates_through_emptied_groups() {
        let root = RuleNode::and(vec![
            cond("a"),
            RuleNode::or(vec![RuleNode::and(vec![cond("b")])]),
        ]);

        let updated = delete_at(&root, &NodePath::from(vec![1, 0, 0])).expect("delete");
        assert_eq!(updated, RuleNode::and(vec![cond("a")]));
    }

    #[test]
    fn deleting_everything_collapses_to_an_empty_condition() {
        let root = RuleNode::or(vec![cond("a")]);
        let updated = delete_at(&root, &NodePath::from(vec![0])).expect("delete");
        assert_eq!(updated, RuleNode::empty_condition());

        let updated = delete_at(&root, &NodePath::root()).expect("delete root");
        assert_eq!(updated, RuleNode::empty_condition());
    }
}
