use std::path::PathBuf;

use thiserror::Error;

/// Errors returned when loading rules or editing a rule tree.
///
/// Evaluation never fails, so there is no evaluation variant.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("malformed rule node: {reason}")]
    Malformed { reason: String },
    #[error("child index {index} is out of bounds for a group with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("node at {path} is not a group")]
    NotAGroup { path: String },
    #[error("node at {path} is not a condition")]
    NotACondition { path: String },
    #[error("invalid node path: {path}")]
    InvalidPath { path: String },
    #[error("rule file does not exist: {0}")]
    MissingPath(String),
    #[error("failed to read rule from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule from {path}: {message}")]
    Parse { path: String, message: String },
}

impl RuleError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        RuleError::Malformed {
            reason: reason.into(),
        }
    }

    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RuleError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RuleError::Parse {
            path: path.into().display().to_string(),
            message: message.into(),
        }
    }

    /// Whether the error stems from a rejected edit rather than bad input.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self,
            RuleError::IndexOutOfBounds { .. }
                | RuleError::NotAGroup { .. }
                | RuleError::NotACondition { .. }
                | RuleError::InvalidPath { .. }
        )
    }
}
