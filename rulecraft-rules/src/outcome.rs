use serde::Serialize;
use serde_json::Value;

use crate::condition::Operator;
use crate::path::NodePath;
use crate::rule::GroupKind;

/// Per-node record of an evaluation, produced by [`crate::explain`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationTrace {
    pub path: NodePath,
    pub matched: bool,
    #[serde(flatten)]
    pub node: TraceNode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceNode {
    Condition {
        field: String,
        operator: Operator,
        /// Value found at `field`, `None` when absent.
        resolved: Option<Value>,
    },
    Group {
        kind: GroupKind,
        children: Vec<EvaluationTrace>,
        /// Children never visited because the group short-circuited.
        skipped: usize,
    },
}
