//! Shared configuration loader for linestate tools.
//!
//! `defaults/linestate.default.toml` is embedded into every binary so that the
//! documented defaults and runtime behavior stay in sync. Applications layer
//! user-specific files and flags on top of those defaults via [`Loader`] before
//! deserializing into [`LinestateConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use linestate::{ParseOptions, Validation};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/linestate.default.toml");

/// Top-level configuration consumed by linestate applications.
#[derive(Debug, Clone, Deserialize)]
pub struct LinestateConfig {
    pub table: TableConfig,
    pub parse: ParseOptions,
    pub log: LogConfig,
}

/// Applied when a table definition does not pick its own validation mode.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub validation: Validation,
}

/// Log filtering and output format.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Level for a log target, falling back to the global level.
    pub fn level_for(&self, target: &str) -> &str {
        let specific = match target {
            "linestate::table" => self.table.as_deref(),
            "linestate::engine" => self.engine.as_deref(),
            _ => None,
        };
        specific.unwrap_or(&self.level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `parse.decoding` from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<LinestateConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<LinestateConfig, ConfigError> {
    Loader::new().build()
}
