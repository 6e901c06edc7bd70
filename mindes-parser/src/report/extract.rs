//! Derived views over a [`Report`]
//!
//!     Raw input     The `CONTENT` column of the inputs table: the input file as the solver
//!                   read it, after macro expansion.
//!     Full input    The echoed prompts and comments: the input file as the user wrote it.
//!     Token rows    The three quoted cells of each token table row.
//!
//!     Extractors never abort. A line that does not have the row shape its bucket promises is
//!     recorded as a [`MalformedRow`] and the remaining lines are still projected; callers
//!     that want all-or-nothing use [`Extraction::into_result`].

use std::fmt;
use std::path::{Path, PathBuf};

use super::classify::{self, Prompt};
use super::model::{Bucket, Report};

/// A bucket line that an extractor could not project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub bucket: Bucket,
    /// Position of the line within its bucket.
    pub index: usize,
    pub line: String,
}

impl fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed {} row {}: {:?}",
            self.bucket, self.index, self.line
        )
    }
}

impl std::error::Error for MalformedRow {}

/// Error returned by [`Extraction::into_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    Malformed(Vec<MalformedRow>),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Malformed(rows) => {
                write!(f, "{} malformed row(s)", rows.len())?;
                for row in rows {
                    write!(f, "\n  {}", row)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Items an extractor recovered, plus the lines it had to give up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T = String> {
    pub items: Vec<T>,
    pub malformed: Vec<MalformedRow>,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            malformed: Vec::new(),
        }
    }
}

impl<T> Extraction<T> {
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<T>, ExtractError> {
        if self.malformed.is_empty() {
            Ok(self.items)
        } else {
            Err(ExtractError::Malformed(self.malformed))
        }
    }

    fn reject(&mut self, bucket: Bucket, index: usize, line: &str) {
        tracing::warn!(%bucket, index, line, "row does not match the expected shape");
        self.malformed.push(MalformedRow {
            bucket,
            index,
            line: line.to_string(),
        });
    }
}

impl Extraction<String> {
    /// Lines joined with `\n`, without a trailing newline.
    pub fn render(&self) -> String {
        self.items.join("\n")
    }

    fn keep(&mut self, text: &str) {
        if !text.is_empty() && !classify::is_separator(text) {
            self.items.push(text.to_string());
        }
    }
}

/// One row of a debug token table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub cells: [String; 3],
}

pub fn extract_raw_input(report: &Report) -> Extraction {
    let mut extraction = Extraction::default();
    for (index, line) in report.inputs.iter().enumerate() {
        match classify::raw_row_content(line) {
            Some(content) => extraction.keep(content),
            None => extraction.reject(Bucket::Inputs, index, line),
        }
    }
    extraction
}

pub fn extract_full_input(report: &Report) -> Extraction {
    let mut extraction = Extraction::default();
    for (index, line) in report.prompts.iter().enumerate() {
        match classify::prompt(line).map(Prompt::text) {
            Some(text) => extraction.keep(text),
            None => extraction.reject(Bucket::Prompts, index, line),
        }
    }
    extraction
}

pub fn extract_token_rows(report: &Report) -> Extraction<TokenRow> {
    let mut extraction = Extraction::default();
    for (index, line) in report.tokens.iter().enumerate() {
        match classify::token_row_cells(line) {
            Some(cells) => extraction.items.push(TokenRow {
                cells: cells.map(str::to_string),
            }),
            None => extraction.reject(Bucket::Tokens, index, line),
        }
    }
    extraction
}

/// Where an extraction of `input` is written when the caller does not choose.
///
/// Reports live in a per-run directory, so `<root>/<run>/input_report.txt` maps to
/// `<root>/<run>.<extension>`. Without such a directory the input's own stem is used.
pub fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let run_dir = input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .and_then(|dir| Some((dir.parent()?, dir.file_name()?)));

    match run_dir {
        Some((root, name)) => {
            let mut file_name = name.to_os_string();
            file_name.push(".");
            file_name.push(extension);
            root.join(file_name)
        }
        None => input.with_extension(extension),
    }
}
