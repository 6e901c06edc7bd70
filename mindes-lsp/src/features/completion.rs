//! Dictionary-backed key completion.
//!
//! The dictionary maps an already typed key prefix (`Solver.Loop`) to the segment names that may
//! follow it. It is read once at startup; a missing or broken file leaves an empty dictionary so
//! the server still starts.

use mindes_parser::completion_prefix;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tower_lsp::lsp_types::CompletionItemKind;

pub const DICTIONARY_FILE_NAME: &str = "AutoCompletion.json";

#[derive(Debug, Clone)]
pub enum DictionaryError {
    Io { path: PathBuf, message: String },
    Json { path: Option<PathBuf>, message: String },
    NotFound(Vec<PathBuf>),
}

impl fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryError::Io { path, message } => {
                write!(f, "cannot read {}: {}", path.display(), message)
            }
            DictionaryError::Json {
                path: Some(path),
                message,
            } => write!(f, "invalid JSON in {}: {}", path.display(), message),
            DictionaryError::Json { path: None, message } => write!(f, "invalid JSON: {}", message),
            DictionaryError::NotFound(searched) => {
                write!(f, "no {} found (searched", DICTIONARY_FILE_NAME)?;
                for path in searched {
                    write!(f, " {}", path.display())?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::error::Error for DictionaryError {}

/// Read-only prefix to candidates table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionDictionary {
    entries: HashMap<String, Vec<String>>,
}

impl CompletionDictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let entries = serde_json::from_str(json).map_err(|err| DictionaryError::Json {
            path: None,
            message: err.to_string(),
        })?;
        Ok(Self { entries })
    }

    pub fn from_path(path: &Path) -> Result<Self, DictionaryError> {
        let json = std::fs::read_to_string(path).map_err(|err| DictionaryError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_json(&json).map_err(|err| match err {
            DictionaryError::Json { message, .. } => DictionaryError::Json {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    /// Candidates for an exact prefix; no fuzzy or partial key matching.
    pub fn lookup(&self, prefix: &str) -> &[String] {
        self.entries.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of startup loading, with a line suitable for the client log.
#[derive(Debug, Clone)]
pub struct LoadedDictionary {
    pub dictionary: CompletionDictionary,
    pub message: String,
    pub failed: bool,
}

/// Places searched when no dictionary path is configured: next to the executable, then the
/// working directory.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.join(DICTIONARY_FILE_NAME));
    }
    paths.push(PathBuf::from(DICTIONARY_FILE_NAME));
    paths
}

/// Load the configured dictionary or the first one found on `search`.
pub fn load_dictionary(
    configured: Option<&Path>,
    search: &[PathBuf],
) -> Result<(CompletionDictionary, PathBuf), DictionaryError> {
    if let Some(path) = configured {
        return CompletionDictionary::from_path(path).map(|dict| (dict, path.to_path_buf()));
    }
    let found = search
        .iter()
        .find(|path| path.is_file())
        .ok_or_else(|| DictionaryError::NotFound(search.to_vec()))?;
    CompletionDictionary::from_path(found).map(|dict| (dict, found.clone()))
}

/// [`load_dictionary`] that degrades to an empty dictionary.
pub fn load_or_empty(configured: Option<&Path>, search: &[PathBuf]) -> LoadedDictionary {
    match load_dictionary(configured, search) {
        Ok((dictionary, path)) => {
            tracing::info!(path = %path.display(), prefixes = dictionary.len(), "completion dictionary loaded");
            LoadedDictionary {
                message: format!("Completions loaded from {}", path.display()),
                dictionary,
                failed: false,
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "completion dictionary unavailable");
            LoadedDictionary {
                dictionary: CompletionDictionary::empty(),
                message: format!("Failed to read completions dictionary: {}", err),
                failed: true,
            }
        }
    }
}

/// Describes a completion candidate that can be translated into protocol specific items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub kind: CompletionItemKind,
}

/// Candidates for the cursor at the end of `before_cursor` (the line up to the cursor).
pub fn completion_items(
    dictionary: &CompletionDictionary,
    before_cursor: &str,
) -> Vec<CompletionCandidate> {
    let prefix = completion_prefix(before_cursor);
    dictionary
        .lookup(&prefix)
        .iter()
        .map(|label| CompletionCandidate {
            label: label.clone(),
            kind: CompletionItemKind::PROPERTY,
        })
        .collect()
}
