use rulecraft_core::OptionCatalog;
use rulecraft_rules::{
    apply_command, convert_to_group, delete_child, evaluate, Condition, DeleteOutcome,
    EditCommand, EditingSession, Group, GroupKind, History, NodePath, Operator, RuleNode,
};
use serde_json::{json, Value};

fn cond(field: &str, operator: Operator, value: &str) -> RuleNode {
    RuleNode::condition(field, operator, value).expect("valid condition")
}

fn sample_documents() -> Vec<Value> {
    vec![
        json!({}),
        json!({"a": "1"}),
        json!({"b": "2"}),
        json!({"a": "1", "b": "2"}),
        json!({"a": "x", "b": ["2"]}),
    ]
}

#[test]
fn groups_combine_their_children_with_and_or() {
    let c1 = cond("a", Operator::Equals, "1");
    let c2 = cond("b", Operator::Contains, "2");
    let and = RuleNode::and(vec![c1.clone(), c2.clone()]);
    let or = RuleNode::or(vec![c1.clone(), c2.clone()]);

    for doc in sample_documents() {
        let (left, right) = (evaluate(&c1, &doc), evaluate(&c2, &doc));
        assert_eq!(evaluate(&and, &doc), left && right, "AND on {doc}");
        assert_eq!(evaluate(&or, &doc), left || right, "OR on {doc}");
    }
}

#[test]
fn convert_then_read_returns_the_condition() {
    let condition = Condition::new("metadata.name", Operator::NotContains, "tmp").expect("valid");
    for kind in [GroupKind::And, GroupKind::Or] {
        let group = convert_to_group(&condition, kind);
        assert_eq!(group.children()[0], RuleNode::Condition(condition.clone()));
    }
}

#[test]
fn single_child_deletion_signals_group_removal() {
    for kind in [GroupKind::And, GroupKind::Or] {
        let group = Group::new(kind, vec![RuleNode::empty_condition()]);
        assert_eq!(delete_child(&group, 0).expect("in bounds"), DeleteOutcome::DeleteGroup);
    }
}

#[test]
fn history_round_trip_and_branch_discard() {
    let s0 = RuleNode::empty_condition();
    let s1 = RuleNode::empty_and_group();
    let s2 = RuleNode::empty_or_group();

    let mut history = History::new(s0.clone());
    history.update(s1.clone());
    history.undo();
    assert_eq!(history.current(), &s0);
    history.redo();
    assert_eq!(history.current(), &s1);

    history.undo();
    history.update(s2.clone());
    assert!(!history.can_redo());
    assert!(!history.redo());
    assert_eq!(history.current(), &s2);
}

#[test]
fn editing_session_builds_the_price_and_tag_rule() {
    let mut session =
        EditingSession::new(RuleNode::empty_and_group(), OptionCatalog::default(), Some(50));
    let first = NodePath::from(vec![0]);
    let second = NodePath::from(vec![1]);
    let commands = [
        EditCommand::SetField {
            path: first.clone(),
            field: "price".into(),
        },
        EditCommand::SetOperator {
            path: first.clone(),
            operator: Operator::GreaterThan,
        },
        EditCommand::SetValue {
            path: first,
            value: "10".into(),
        },
        EditCommand::AddCondition {
            group: NodePath::root(),
        },
        EditCommand::SetField {
            path: second.clone(),
            field: "tag".into(),
        },
        EditCommand::SetOperator {
            path: second.clone(),
            operator: Operator::In,
        },
        EditCommand::SetValue {
            path: second,
            value: vec!["red", "blue"].into(),
        },
    ];
    for command in &commands {
        session.apply(command).expect("edit applies");
    }

    let expected: RuleNode = serde_json::from_value(json!({"AND": [
        {"field": "price", "operator": "GREATER_THAN", "value": "10"},
        {"field": "tag", "operator": "IN", "value": ["red", "blue"]}
    ]}))
    .expect("valid rule");
    assert_eq!(session.current(), &expected);

    assert!(session.evaluate(&json!({"price": "15", "tag": "blue"})));
    assert!(!session.evaluate(&json!({"price": "5", "tag": "blue"})));
    assert!(!session.evaluate(&json!({"price": "15", "tag": "green"})));

    for _ in &commands {
        assert!(session.undo());
    }
    assert!(!session.can_undo());
    assert_eq!(session.current(), &RuleNode::empty_and_group());
}

#[test]
fn commands_are_pure() {
    let root = RuleNode::and(vec![cond("a", Operator::Equals, "1")]);
    let before = root.clone();
    let command = EditCommand::DeleteNode {
        path: NodePath::from(vec![0]),
    };
    let updated = apply_command(&root, &command).expect("delete");
    assert_eq!(updated, RuleNode::empty_condition());
    assert_eq!(root, before);
}
