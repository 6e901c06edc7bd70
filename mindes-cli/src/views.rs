//! Printable views over reports, documents and configuration
//!
//! Each function renders one subcommand's stdout. Writing files and exit codes stay in main.

use std::fmt;
use std::path::PathBuf;

use mindes_config::{ConfigError, MindesConfig};
use mindes_parser::{
    tokenize_text, ExtractError, Extraction, LoaderError, MalformedRow, ReportLoader,
};

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Load(LoaderError),
    Malformed(ExtractError),
    Write { path: PathBuf, message: String },
    Json(serde_json::Error),
    HighlightingDisabled,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(err) => write!(f, "invalid configuration: {}", err),
            CliError::Load(err) => write!(f, "{}", err),
            CliError::Malformed(err) => write!(f, "{}", err),
            CliError::Write { path, message } => {
                write!(f, "cannot write {}: {}", path.display(), message)
            }
            CliError::Json(err) => write!(f, "JSON serialization failed: {}", err),
            CliError::HighlightingDisabled => {
                write!(f, "semantic highlighting is disabled in the configuration")
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err)
    }
}

impl From<LoaderError> for CliError {
    fn from(err: LoaderError) -> Self {
        CliError::Load(err)
    }
}

impl From<ExtractError> for CliError {
    fn from(err: ExtractError) -> Self {
        CliError::Malformed(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}

/// Report buckets as pretty JSON, keyed by bucket name.
pub fn sections_json(loader: &ReportLoader) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&loader.report())?)
}

/// One `line:column:length subkeyN` line per dotted-key segment.
pub fn token_listing(source: &str) -> String {
    tokenize_text(source)
        .iter()
        .map(|token| {
            format!(
                "{}:{}:{} subkey{}\n",
                token.line,
                token.column,
                token.length,
                token.rank + 1
            )
        })
        .collect()
}

pub fn theme_json(config: &MindesConfig) -> Result<String, CliError> {
    let rules = config
        .highlighting
        .color_rules()
        .ok_or(CliError::HighlightingDisabled)?;
    let theme = serde_json::json!({ "editor.semanticTokenColorCustomizations": rules });
    Ok(serde_json::to_string_pretty(&theme)?)
}

pub fn associations_json(config: &MindesConfig) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(&config.files.associations())?)
}

/// Lenient extractions pass through with their malformed rows; strict ones fail on any.
pub fn checked(
    extraction: Extraction,
    strict: bool,
) -> Result<(String, Vec<MalformedRow>), CliError> {
    if strict {
        return Ok((extraction.into_result()?.join("\n"), Vec::new()));
    }
    let rendered = extraction.render();
    Ok((rendered, extraction.malformed))
}
