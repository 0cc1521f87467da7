use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::condition::{Condition, ConditionValue, FieldPath, Operator};
use crate::error::RuleError;
use crate::path::NodePath;

/// Combinator of a [`Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupKind {
    And,
    Or,
}

impl GroupKind {
    /// Wire key carrying the children, `AND` or `OR`.
    pub fn key(self) -> &'static str {
        match self {
            GroupKind::And => "AND",
            GroupKind::Or => "OR",
        }
    }
}

/// Single discriminant of a [`RuleNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Condition,
    And,
    Or,
}

/// AND/OR combinator over an ordered sequence of child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    kind: GroupKind,
    children: Vec<RuleNode>,
}

impl Group {
    pub fn new(kind: GroupKind, children: Vec<RuleNode>) -> Self {
        Self { kind, children }
    }

    /// A group holding a single empty condition.
    pub fn empty(kind: GroupKind) -> Self {
        Self::new(kind, vec![RuleNode::empty_condition()])
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn children(&self) -> &[RuleNode] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.key(), &self.children)?;
        map.end()
    }
}

/// Node of a rule tree: either a [`Condition`] or a [`Group`].
///
/// Encoded as `{"field", "operator", "value"}`, `{"AND": [...]}` or
/// `{"OR": [...]}`. Decoding rejects anything else instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawNode")]
pub enum RuleNode {
    Condition(Condition),
    Group(Group),
}

impl RuleNode {
    pub fn empty_condition() -> Self {
        RuleNode::Condition(Condition::empty())
    }

    pub fn empty_and_group() -> Self {
        RuleNode::Group(Group::empty(GroupKind::And))
    }

    pub fn empty_or_group() -> Self {
        RuleNode::Group(Group::empty(GroupKind::Or))
    }

    pub fn empty_group(kind: GroupKind) -> Self {
        RuleNode::Group(Group::empty(kind))
    }

    pub fn and(children: Vec<RuleNode>) -> Self {
        RuleNode::Group(Group::new(GroupKind::And, children))
    }

    pub fn or(children: Vec<RuleNode>) -> Self {
        RuleNode::Group(Group::new(GroupKind::Or, children))
    }

    /// Shorthand for a condition node; fails when the value shape does not
    /// match the operator.
    pub fn condition(
        field: impl Into<FieldPath>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Result<Self, RuleError> {
        Condition::new(field, operator, value).map(RuleNode::Condition)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            RuleNode::Condition(_) => NodeKind::Condition,
            RuleNode::Group(group) => match group.kind() {
                GroupKind::And => NodeKind::And,
                GroupKind::Or => NodeKind::Or,
            },
        }
    }

    pub fn is_condition(&self) -> bool {
        self.kind() == NodeKind::Condition
    }

    pub fn is_and_group(&self) -> bool {
        self.kind() == NodeKind::And
    }

    pub fn is_or_group(&self) -> bool {
        self.kind() == NodeKind::Or
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            RuleNode::Condition(condition) => Some(condition),
            RuleNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            RuleNode::Group(group) => Some(group),
            RuleNode::Condition(_) => None,
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        match self {
            RuleNode::Condition(_) => 1,
            RuleNode::Group(group) => {
                1 + group.children().iter().map(RuleNode::node_count).sum::<usize>()
            }
        }
    }

    /// Length of the longest root-to-leaf chain; a lone condition has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            RuleNode::Condition(_) => 1,
            RuleNode::Group(group) => {
                1 + group.children().iter().map(RuleNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Looks up the node addressed by `path`.
    pub fn get(&self, path: &NodePath) -> Option<&RuleNode> {
        let mut current = self;
        for &index in path.indices() {
            current = current.as_group()?.children().get(index)?;
        }
        Some(current)
    }
}

impl Default for RuleNode {
    fn default() -> Self {
        RuleNode::empty_condition()
    }
}

impl From<Condition> for RuleNode {
    fn from(condition: Condition) -> Self {
        RuleNode::Condition(condition)
    }
}

impl From<Group> for RuleNode {
    fn from(group: Group) -> Self {
        RuleNode::Group(group)
    }
}

impl Serialize for RuleNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleNode::Condition(condition) => condition.serialize(serializer),
            RuleNode::Group(group) => group.serialize(serializer),
        }
    }
}

/// Decoded form of a node. Each field is `Some` when its key is present,
/// even if the value is `null`, so that key presence decides the shape.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
    #[serde(default, deserialize_with = "present")]
    field: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    operator: Option<Option<Operator>>,
    #[serde(default, deserialize_with = "present")]
    value: Option<Option<ConditionValue>>,
    #[serde(rename = "AND", default, deserialize_with = "present")]
    and: Option<Option<Vec<RuleNode>>>,
    #[serde(rename = "OR", default, deserialize_with = "present")]
    or: Option<Option<Vec<RuleNode>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn required<T>(slot: Option<Option<T>>, key: &str) -> Result<T, RuleError> {
    match slot {
        Some(Some(value)) => Ok(value),
        Some(None) => Err(RuleError::malformed(format!("`{key}` must not be null"))),
        None => Err(RuleError::malformed(format!("condition is missing `{key}`"))),
    }
}

impl TryFrom<RawNode> for RuleNode {
    type Error = RuleError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let has_condition_keys =
            raw.field.is_some() || raw.operator.is_some() || raw.value.is_some();

        match (has_condition_keys, raw.and.is_some(), raw.or.is_some()) {
            (false, true, false) => Ok(RuleNode::and(required(raw.and, "AND")?)),
            (false, false, true) => Ok(RuleNode::or(required(raw.or, "OR")?)),
            (true, false, false) => RuleNode::condition(
                required(raw.field, "field")?,
                required(raw.operator, "operator")?,
                required(raw.value, "value")?,
            ),
            (false, false, false) => Err(RuleError::malformed(
                "node is neither a condition nor an AND/OR group",
            )),
            (false, true, true) => Err(RuleError::malformed(
                "group carries both `AND` and `OR` keys",
            )),
            (true, _, _) => Err(RuleError::malformed(
                "node mixes condition keys with group keys",
            )),
        }
    }
}
