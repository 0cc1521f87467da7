//! Core shared library for the RuleCraft ecosystem.
//!
//! This crate exposes the ambient pieces every RuleCraft binary depends on:
//! common errors, configuration loading (including the option catalogue
//! injected into editing sessions), JSON helpers and logging setup.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use catalog::OptionCatalog;
pub use config::RuleCraftConfig;
pub use errors::{CoreError, Result as CoreResult};
