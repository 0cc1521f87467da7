//! Rule expressions for filtering JSON documents.
//!
//! A rule is a tree of conditions combined with AND/OR groups. This crate
//! holds the tree model and its wire format, the evaluator used to test a
//! rule against sample documents, the pure edit operations used by editors,
//! and the undo/redo history that records every edit. Editing sessions and
//! an HTTP API tie those together for UI clients.

mod command;
mod condition;
mod edit;
mod error;
mod evaluator;
mod history;
mod loader;
mod outcome;
mod path;
mod rule;
mod service;
mod session;
mod store;

pub use command::{apply_command, EditCommand};
pub use condition::{Condition, ConditionValue, FieldPath, Operator};
pub use edit::{
    add_child, add_condition, add_condition_at, add_group, add_group_at, convert_at,
    convert_to_group, delete_at, delete_child, replace_child, update_at, update_condition_at,
    update_group_at, DeleteOutcome,
};
pub use error::RuleError;
pub use evaluator::{coerce_number, evaluate, evaluate_all, explain, parse_number, stringify};
pub use history::History;
pub use loader::{load_rule, parse_rule};
pub use outcome::{EvaluationTrace, TraceNode};
pub use path::NodePath;
pub use rule::{Group, GroupKind, NodeKind, RuleNode};
pub use service::{RuleApiBuilder, RuleServiceConfig};
pub use session::EditingSession;
pub use store::{SessionRegistry, SessionSnapshot};
