//! Report loading utilities
//!
//! `ReportLoader` holds the text of one input report, read from a file or given as a string,
//! and offers the parse and extraction shortcuts used by the CLI, the language server and tests.
//!
//! # Example
//!
//! ```rust
//! use mindes_parser::ReportLoader;
//!
//! let loader = ReportLoader::from_path("run1/input_report.txt").unwrap();
//! let raw = loader.raw_input();
//! println!("{}", raw.render());
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::extract::{
    extract_full_input, extract_raw_input, extract_token_rows, Extraction, TokenRow,
};
use super::model::Report;
use super::sections::parse_report;

/// Error that can occur when loading a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// No file at the given path
    Missing(PathBuf),
    /// The file exists but could not be read as UTF-8 text
    Io { path: PathBuf, message: String },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::Missing(path) => write!(f, "no input report at {}", path.display()),
            LoaderError::Io { path, message } => {
                write!(f, "cannot read {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for LoaderError {}

impl LoaderError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => LoaderError::Missing(path.to_path_buf()),
            _ => LoaderError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }
}

pub struct ReportLoader {
    source: String,
}

impl ReportLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| LoaderError::from_io(path, err))?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded input report");
        Ok(ReportLoader { source })
    }

    pub fn from_string<S: Into<String>>(source: S) -> Self {
        ReportLoader {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn report(&self) -> Report {
        parse_report(&self.source)
    }

    pub fn raw_input(&self) -> Extraction {
        extract_raw_input(&self.report())
    }

    pub fn full_input(&self) -> Extraction {
        extract_full_input(&self.report())
    }

    pub fn token_rows(&self) -> Extraction<TokenRow> {
        extract_token_rows(&self.report())
    }
}
