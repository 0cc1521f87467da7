//! Recognised value lists for fields such as `destination` or `category`.
//!
//! Editing sessions receive a catalogue when they start; nothing in the core
//! fetches option lists on its own.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCatalog {
    #[serde(default)]
    fields: BTreeMap<String, Vec<String>>,
}

impl OptionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the recognised values for `field`, replacing earlier ones.
    pub fn with_field<I, S>(mut self, field: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(field.into(), options.into_iter().map(Into::into).collect());
        self
    }

    pub fn options_for(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::CatalogParse {
            path: origin.to_string(),
            message: err.to_string(),
        })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::CatalogIo {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_toml_str(&raw, &path.display().to_string())?;
        debug!(path = %path.display(), fields = catalog.fields.len(), "loaded option catalogue");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_tables() {
        let raw = r#"
            [fields]
            destination = ["archive", "inbox"]
            category = ["billing"]
        "#;
        let catalog = OptionCatalog::from_toml_str(raw, "inline").expect("catalog");

        assert_eq!(
            catalog.options_for("destination"),
            Some(&["archive".to_string(), "inbox".to_string()][..])
        );
        assert_eq!(catalog.fields().collect::<Vec<_>>(), vec!["category", "destination"]);
        assert!(catalog.options_for("metadata.name").is_none());
    }

    #[test]
    fn reports_parse_failures_with_origin() {
        let err = OptionCatalog::from_toml_str("fields = 3", "broken.toml").unwrap_err();
        match err {
            ConfigError::CatalogParse { path, .. } => assert_eq!(path, "broken.toml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
