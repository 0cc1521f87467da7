use std::env;
use std::path::PathBuf;

use crate::catalog::OptionCatalog;
use crate::errors::ConfigError;

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8090";
const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Runtime configuration shared by the CLI and the HTTP API.
#[derive(Debug, Clone)]
pub struct RuleCraftConfig {
    pub http_bind: String,
    /// Maximum number of undo steps kept per editing session. `None` keeps
    /// every step.
    pub history_depth: Option<usize>,
    pub log_level: Option<String>,
    pub options_file: Option<PathBuf>,
}

impl Default for RuleCraftConfig {
    fn default() -> Self {
        Self {
            http_bind: DEFAULT_HTTP_BIND.to_string(),
            history_depth: Some(DEFAULT_HISTORY_DEPTH),
            log_level: None,
            options_file: None,
        }
    }
}

impl RuleCraftConfig {
    /// Loads configuration from the process environment (`RULECRAFT_*`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("RULECRAFT_")
    }

    /// Loads configuration from env vars prefixed with the provided value.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let http_bind = env::var(key("HTTP_BIND"))
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());

        let depth_key = key("HISTORY_DEPTH");
        let history_depth = match env::var(&depth_key) {
            Ok(raw) => parse_history_depth(&depth_key, &raw)?,
            Err(_) => Some(DEFAULT_HISTORY_DEPTH),
        };

        let log_level = env::var(key("LOG")).ok();
        let options_file = env::var(key("OPTIONS_FILE")).ok().map(PathBuf::from);

        Ok(Self {
            http_bind,
            history_depth,
            log_level,
            options_file,
        })
    }

    /// Loads the option catalogue named by `options_file`, or an empty one.
    pub fn load_catalog(&self) -> Result<OptionCatalog, ConfigError> {
        match &self.options_file {
            Some(path) => OptionCatalog::from_toml_file(path),
            None => Ok(OptionCatalog::default()),
        }
    }
}

fn parse_history_depth(key: &str, raw: &str) -> Result<Option<usize>, ConfigError> {
    let depth: usize = raw.trim().parse().map_err(|err: std::num::ParseIntError| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: err.to_string(),
        }
    })?;
    Ok(if depth == 0 { None } else { Some(depth) })
}
