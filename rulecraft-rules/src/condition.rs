use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RuleError;

/// Dot-delimited path into a document, e.g. `metadata.name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.segments().next().is_none()
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|segment| !segment.is_empty())
    }

    /// Resolves the path against `root`, descending through objects only.
    ///
    /// Returns `None` ("absent") when a segment is missing or the walk reaches
    /// a non-object before the path is exhausted. An empty path is absent too.
    pub fn locate<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        if self.is_empty() {
            return None;
        }
        let mut current = root;
        for segment in self.segments() {
            match current {
                Value::Object(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath::new(value)
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        FieldPath::new(value)
    }
}

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    In,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::In,
    ];

    /// Only `IN` takes a list of values.
    pub fn expects_list(self) -> bool {
        matches!(self, Operator::In)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Contains => "CONTAINS",
            Operator::NotContains => "NOT_CONTAINS",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::LessThan => "LESS_THAN",
            Operator::In => "IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition. Its shape is dictated by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Single(String),
    List(Vec<String>),
}

impl ConditionValue {
    /// The empty value matching the shape `operator` expects.
    pub fn empty_for(operator: Operator) -> Self {
        if operator.expects_list() {
            ConditionValue::List(Vec::new())
        } else {
            ConditionValue::Single(String::new())
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ConditionValue::List(_))
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            ConditionValue::Single(value) => Some(value),
            ConditionValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConditionValue::List(values) => Some(values),
            ConditionValue::Single(_) => None,
        }
    }

    fn fits(&self, operator: Operator) -> bool {
        self.is_list() == operator.expects_list()
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Single(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Single(value)
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(values: Vec<String>) -> Self {
        ConditionValue::List(values)
    }
}

impl From<Vec<&str>> for ConditionValue {
    fn from(values: Vec<&str>) -> Self {
        ConditionValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Leaf of a rule tree: tests one document field against a value.
///
/// Fields are private so that the value shape always agrees with the
/// operator; use the `with_*` methods to derive modified copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConditionRepr")]
pub struct Condition {
    field: FieldPath,
    operator: Operator,
    value: ConditionValue,
}

impl Condition {
    pub fn new(
        field: impl Into<FieldPath>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Result<Self, RuleError> {
        let value = value.into();
        if !value.fits(operator) {
            return Err(shape_mismatch(operator, &value));
        }
        Ok(Self {
            field: field.into(),
            operator,
            value,
        })
    }

    /// `field = ""`, `operator = EQUALS`, `value = ""`.
    pub fn empty() -> Self {
        Self {
            field: FieldPath::default(),
            operator: Operator::Equals,
            value: ConditionValue::empty_for(Operator::Equals),
        }
    }

    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &ConditionValue {
        &self.value
    }

    pub fn with_field(&self, field: impl Into<FieldPath>) -> Self {
        Self {
            field: field.into(),
            ..self.clone()
        }
    }

    /// Switches the operator. Crossing the `IN` boundary resets the value to
    /// the empty value of the new shape; otherwise the value is kept.
    pub fn with_operator(&self, operator: Operator) -> Self {
        let value = if self.value.fits(operator) {
            self.value.clone()
        } else {
            ConditionValue::empty_for(operator)
        };
        Self {
            field: self.field.clone(),
            operator,
            value,
        }
    }

    pub fn with_value(&self, value: impl Into<ConditionValue>) -> Result<Self, RuleError> {
        Self::new(self.field.clone(), self.operator, value)
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::empty()
    }
}

fn shape_mismatch(operator: Operator, value: &ConditionValue) -> RuleError {
    let found = if value.is_list() { "a list" } else { "a single string" };
    let expected = if operator.expects_list() {
        "a list of strings"
    } else {
        "a single string"
    };
    RuleError::malformed(format!(
        "operator {operator} expects {expected} as value, found {found}"
    ))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionRepr {
    field: String,
    operator: Operator,
    value: ConditionValue,
}

impl TryFrom<ConditionRepr> for Condition {
    type Error = RuleError;

    fn try_from(repr: ConditionRepr) -> Result<Self, Self::Error> {
        Condition::new(repr.field, repr.operator, repr.value)
    }
}
