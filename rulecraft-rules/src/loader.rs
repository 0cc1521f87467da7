use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::RuleError;
use crate::rule::RuleNode;

/// Loads a single rule from a JSON or YAML file.
///
/// The file is decoded with the YAML parser, which also reads JSON, so the
/// extension does not matter. Every node is validated on the way in.
pub fn load_rule(path: impl AsRef<Path>) -> Result<RuleNode, RuleError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RuleError::MissingPath(path.display().to_string()));
    }
    let raw = fs::read_to_string(path).map_err(|err| RuleError::from_io(path, err))?;
    let rule = parse_rule_from(&raw, path)?;
    debug!(path = %path.display(), nodes = rule.node_count(), "loaded rule");
    Ok(rule)
}

/// Parses a rule held in memory.
pub fn parse_rule(raw: &str) -> Result<RuleNode, RuleError> {
    parse_rule_from(raw, Path::new("<inline>"))
}

fn parse_rule_from(raw: &str, origin: &Path) -> Result<RuleNode, RuleError> {
    serde_yaml::from_str::<RuleNode>(raw)
        .map_err(|err| RuleError::parse_error(origin.to_path_buf(), err.to_string()))
}
