use rulecraft_core::OptionCatalog;
use serde_json::Value;
use tracing::warn;

use crate::command::{apply_command, EditCommand};
use crate::error::RuleError;
use crate::evaluator::{evaluate, explain};
use crate::history::History;
use crate::outcome::EvaluationTrace;
use crate::rule::RuleNode;

/// One editor's working copy of a rule, with undo/redo.
#[derive(Debug, Clone)]
pub struct EditingSession {
    history: History<RuleNode>,
    catalog: OptionCatalog,
}

impl EditingSession {
    /// Starts a session on `initial` with the option catalogue injected by
    /// the host.
    pub fn new(initial: RuleNode, catalog: OptionCatalog, max_depth: Option<usize>) -> Self {
        Self {
            history: History::with_max_depth(initial, max_depth),
            catalog,
        }
    }

    /// Starts a session on a single empty condition.
    pub fn empty(catalog: OptionCatalog, max_depth: Option<usize>) -> Self {
        Self::new(RuleNode::empty_condition(), catalog, max_depth)
    }

    pub fn current(&self) -> &RuleNode {
        self.history.current()
    }

    /// Applies an edit to the current rule and records it. A rejected edit
    /// leaves the history untouched.
    pub fn apply(&mut self, command: &EditCommand) -> Result<&RuleNode, RuleError> {
        let next = apply_command(self.history.current(), command).map_err(|err| {
            warn!(command = command.name(), %err, "edit rejected");
            err
        })?;
        self.history.update(next);
        Ok(self.history.current())
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn evaluate(&self, document: &Value) -> bool {
        evaluate(self.current(), document)
    }

    pub fn explain(&self, document: &Value) -> EvaluationTrace {
        explain(self.current(), document)
    }

    /// Recognised values for `field`, if the catalogue lists any.
    pub fn value_options(&self, field: &str) -> Option<&[String]> {
        self.catalog.options_for(field)
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }
}
