//! Scores a rule tree against a JSON document.
//!
//! Evaluation is total: every rule/document pair yields a boolean. Missing
//! fields resolve to "absent" and numeric operators on non-numeric input
//! are simply false.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;
use tracing::trace;

use crate::condition::{Condition, ConditionValue, Operator};
use crate::outcome::{EvaluationTrace, TraceNode};
use crate::path::NodePath;
use crate::rule::{GroupKind, RuleNode};

/// Evaluates `node` against `document`, short-circuiting groups left to right.
pub fn evaluate(node: &RuleNode, document: &Value) -> bool {
    match node {
        RuleNode::Condition(condition) => evaluate_condition(condition, document),
        RuleNode::Group(group) => match group.kind() {
            GroupKind::And => group.children().iter().all(|child| evaluate(child, document)),
            GroupKind::Or => group.children().iter().any(|child| evaluate(child, document)),
        },
    }
}

/// Evaluates the same rule against every sample document, in order.
pub fn evaluate_all<'a, I>(node: &RuleNode, documents: I) -> Vec<bool>
where
    I: IntoIterator<Item = &'a Value>,
{
    documents
        .into_iter()
        .map(|document| evaluate(node, document))
        .collect()
}

/// Like [`evaluate`], but records the result of every visited node.
pub fn explain(node: &RuleNode, document: &Value) -> EvaluationTrace {
    explain_at(node, document, NodePath::root())
}

fn explain_at(node: &RuleNode, document: &Value, path: NodePath) -> EvaluationTrace {
    match node {
        RuleNode::Condition(condition) => {
            let matched = evaluate_condition(condition, document);
            trace!(
                %path,
                field = %condition.field(),
                operator = %condition.operator(),
                matched,
                "condition evaluated"
            );
            EvaluationTrace {
                path,
                matched,
                node: TraceNode::Condition {
                    field: condition.field().as_str().to_string(),
                    operator: condition.operator(),
                    resolved: condition.field().locate(document).cloned(),
                },
            }
        }
        RuleNode::Group(group) => {
            // AND stops on the first false child, OR on the first true one.
            let stop_on = group.kind() == GroupKind::Or;
            let mut children = Vec::with_capacity(group.len());
            let mut matched = !stop_on;
            for (index, child) in group.children().iter().enumerate() {
                let child_trace = explain_at(child, document, path.child(index));
                let child_matched = child_trace.matched;
                children.push(child_trace);
                if child_matched == stop_on {
                    matched = stop_on;
                    break;
                }
            }
            let skipped = group.len() - children.len();
            EvaluationTrace {
                path,
                matched,
                node: TraceNode::Group {
                    kind: group.kind(),
                    children,
                    skipped,
                },
            }
        }
    }
}

fn evaluate_condition(condition: &Condition, document: &Value) -> bool {
    let resolved = condition.field().locate(document);

    // Condition::new guarantees the value shape matches the operator, so the
    // fallback arm is never reached for a well-formed condition.
    match (condition.operator(), condition.value()) {
        (Operator::Equals, ConditionValue::Single(expected)) => {
            resolved.map_or(false, |actual| stringify(actual) == expected.as_str())
        }
        (Operator::NotEquals, ConditionValue::Single(expected)) => {
            resolved.map_or(true, |actual| stringify(actual) != expected.as_str())
        }
        (Operator::Contains, ConditionValue::Single(needle)) => {
            resolved.map_or(false, |actual| contains(actual, needle))
        }
        (Operator::NotContains, ConditionValue::Single(needle)) => {
            !resolved.map_or(false, |actual| contains(actual, needle))
        }
        (Operator::GreaterThan, ConditionValue::Single(bound)) => {
            compare_numbers(resolved, bound) == Some(Ordering::Greater)
        }
        (Operator::LessThan, ConditionValue::Single(bound)) => {
            compare_numbers(resolved, bound) == Some(Ordering::Less)
        }
        (Operator::In, ConditionValue::List(options)) => resolved.map_or(false, |actual| {
            let actual = stringify(actual);
            options.iter().any(|option| option.as_str() == actual)
        }),
        _ => false,
    }
}

/// Text form of a JSON value used by the string operators. Strings are
/// taken verbatim; everything else uses compact JSON.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Substring test for strings, element membership for arrays.
fn contains(actual: &Value, needle: &str) -> bool {
    match actual {
        Value::String(text) => text.contains(needle),
        Value::Array(items) => items.iter().any(|item| stringify(item) == needle),
        _ => false,
    }
}

fn compare_numbers(resolved: Option<&Value>, bound: &str) -> Option<Ordering> {
    let lhs = coerce_number(resolved?)?;
    let rhs = parse_number(bound)?;
    lhs.partial_cmp(&rhs)
}

/// JSON numbers are used as is and strings are parsed; other types never
/// coerce.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => parse_number(text),
        _ => None,
    }
}

/// Parses a decimal number after trimming whitespace. No locale handling;
/// leading zeros are accepted, infinities and NaN are not.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
