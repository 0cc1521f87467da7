use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::condition::{ConditionValue, FieldPath, Operator};
use crate::edit;
use crate::error::RuleError;
use crate::path::NodePath;
use crate::rule::{GroupKind, RuleNode};

/// Editing gesture addressed at a node of the current rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditCommand {
    /// Append an empty condition to the group at `group`.
    AddCondition { group: NodePath },
    /// Append an empty AND/OR group to the group at `group`.
    AddGroup { group: NodePath, kind: GroupKind },
    /// Remove a node; groups left empty are removed as well.
    DeleteNode { path: NodePath },
    /// Wrap the condition at `path` into a new group.
    ConvertToGroup { path: NodePath, kind: GroupKind },
    SetField { path: NodePath, field: FieldPath },
    /// Change the operator, resetting the value when it changes shape.
    SetOperator { path: NodePath, operator: Operator },
    SetValue { path: NodePath, value: ConditionValue },
    /// Replace the node at `path` (the whole rule for `/`). The replacement
    /// may not contain empty groups.
    ReplaceNode { path: NodePath, node: RuleNode },
}

impl EditCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::AddCondition { .. } => "add_condition",
            EditCommand::AddGroup { .. } => "add_group",
            EditCommand::DeleteNode { .. } => "delete_node",
            EditCommand::ConvertToGroup { .. } => "convert_to_group",
            EditCommand::SetField { .. } => "set_field",
            EditCommand::SetOperator { .. } => "set_operator",
            EditCommand::SetValue { .. } => "set_value",
            EditCommand::ReplaceNode { .. } => "replace_node",
        }
    }
}

/// Applies `command` to `root`, returning the edited copy.
pub fn apply_command(root: &RuleNode, command: &EditCommand) -> Result<RuleNode, RuleError> {
    debug!(command = command.name(), "applying edit");
    match command {
        EditCommand::AddCondition { group } => edit::add_condition_at(root, group),
        EditCommand::AddGroup { group, kind } => edit::add_group_at(root, group, *kind),
        EditCommand::DeleteNode { path } => edit::delete_at(root, path),
        EditCommand::ConvertToGroup { path, kind } => edit::convert_at(root, path, *kind),
        EditCommand::SetField { path, field } => edit::update_condition_at(root, path, |c| {
            Ok(c.with_field(field.clone()).into())
        }),
        EditCommand::SetOperator { path, operator } => {
            edit::update_condition_at(root, path, |c| Ok(c.with_operator(*operator).into()))
        }
        EditCommand::SetValue { path, value } => edit::update_condition_at(root, path, |c| {
            c.with_value(value.clone()).map(RuleNode::from)
        }),
        EditCommand::ReplaceNode { path, node } => {
            reject_empty_groups(node, path)?;
            edit::update_at(root, path, |_| Ok(node.clone()))
        }
    }
}

fn reject_empty_groups(node: &RuleNode, path: &NodePath) -> Result<(), RuleError> {
    let Some(group) = node.as_group() else {
        return Ok(());
    };
    if group.is_empty() {
        return Err(RuleError::malformed(format!(
            "replacement holds an empty {} group at {path}",
            group.kind().key()
        )));
    }
    group
        .children()
        .iter()
        .enumerate()
        .try_for_each(|(index, child)| reject_empty_groups(child, &path.child(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tagged_commands() {
        let command: EditCommand = serde_json::from_value(json!({
            "type": "set_operator",
            "path": "/0",
            "operator": "IN"
        }))
        .expect("decode");

        assert_eq!(
            command,
            EditCommand::SetOperator {
                path: NodePath::from(vec![0]),
                operator: Operator::In,
            }
        );
    }

    #[test]
    fn builds_a_rule_step_by_step() {
        let root = RuleNode::empty_and_group();
        let first = NodePath::from(vec![0]);

        let steps = [
            EditCommand::SetField {
                path: first.clone(),
                field: "price".into(),
            },
            EditCommand::SetOperator {
                path: first.clone(),
                operator: Operator::GreaterThan,
            },
            EditCommand::SetValue {
                path: first.clone(),
                value: "10".into(),
            },
            EditCommand::AddCondition {
                group: NodePath::root(),
            },
            EditCommand::ConvertToGroup {
                path: NodePath::from(vec![1]),
                kind: GroupKind::Or,
            },
        ];
        let rule = steps
            .iter()
            .try_fold(root, |rule, step| apply_command(&rule, step))
            .expect("every step applies");

        assert_eq!(
            serde_json::to_value(&rule).expect("serialize"),
            json!({"AND": [
                {"field": "price", "operator": "GREATER_THAN", "value": "10"},
                {"OR": [{"field": "", "operator": "EQUALS", "value": ""}]}
            ]})
        );
    }

    #[test]
    fn set_value_rejects_mismatched_shapes() {
        let root = RuleNode::empty_condition();
        let err = apply_command(
            &root,
            &EditCommand::SetValue {
                path: NodePath::root(),
                value: ConditionValue::from(vec!["a"]),
            },
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::Malformed { .. }));
    }

    #[test]
    fn replace_rejects_empty_groups() {
        let root = RuleNode::and(vec![RuleNode::empty_condition(), RuleNode::empty_condition()]);
        let nested_empty: RuleNode =
            serde_json::from_value(json!({"OR": [{"AND": []}]})).expect("decodes");

        for node in [RuleNode::and(vec![]), nested_empty] {
            let err = apply_command(
                &root,
                &EditCommand::ReplaceNode {
                    path: NodePath::from(vec![1]),
                    node,
                },
            )
            .unwrap_err();
            assert!(matches!(err, RuleError::Malformed { .. }), "{err}");
        }

        let err = apply_command(
            &root,
            &EditCommand::ReplaceNode {
                path: NodePath::from(vec![1]),
                node: RuleNode::or(vec![]),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("/1"), "{err}");
    }

    #[test]
    fn replace_at_root_swaps_the_whole_rule() {
        let replacement = RuleNode::empty_or_group();
        let rule = apply_command(
            &RuleNode::empty_condition(),
            &EditCommand::ReplaceNode {
                path: NodePath::root(),
                node: replacement.clone(),
            },
        )
        .expect("replace");
        assert_eq!(rule, replacement);
    }
}
