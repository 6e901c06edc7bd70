//! Shared configuration loader for the MInDes tooling.
//!
//! `defaults/mindes.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MindesConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/mindes.default.toml");

/// Top-level configuration consumed by MInDes applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MindesConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub highlighting: HighlightingConfig,
    pub files: FilesConfig,
    pub extract: ExtractConfig,
}

/// Language server settings that only make sense at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub completion_dictionary: Option<PathBuf>,
}

/// Per-rank semantic highlighting.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightingConfig {
    pub enabled: bool,
    /// `subkey1`..`subkey8` to a foreground colour.
    pub colors: BTreeMap<String, String>,
}

impl HighlightingConfig {
    /// Editor rule set for `editor.semanticTokenColorCustomizations`.
    ///
    /// `None` when highlighting is disabled or no colours are configured.
    pub fn color_rules(&self) -> Option<Value> {
        if !self.enabled || self.colors.is_empty() {
            return None;
        }
        let rules: Map<String, Value> = self
            .colors
            .iter()
            .map(|(subkey, color)| (subkey.clone(), json!({ "foreground": color })))
            .collect();
        Some(json!({ "rules": rules }))
    }
}

/// How report files are recognized by editors.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    pub report_pattern: String,
    pub language_id: String,
}

impl FilesConfig {
    /// A `files.associations` entry mapping the report pattern to the MInDes language.
    pub fn associations(&self) -> Value {
        let mut associations = Map::new();
        associations.insert(
            self.report_pattern.clone(),
            Value::String(self.language_id.clone()),
        );
        json!({ "files.associations": associations })
    }
}

/// Extraction output knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub output_extension: String,
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

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MindesConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MindesConfig, ConfigError> {
    Loader::new().build()
}
