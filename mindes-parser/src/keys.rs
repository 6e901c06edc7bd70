//! Dotted keys
//!
//!     MInDes documents are mostly `key.sub.sub = value` lines. Each `.`-separated segment of
//!     the key gets its own highlighting rank so deeply nested keys stay readable: the first
//!     segment is rank 0, the second rank 1, and so on up to [`MAX_KEY_RANKS`] ranks.
//!     Segments past the last rank are left unclassified rather than folded into a reused rank.
//!
//!     The same segmentation drives completion: the text before the cursor, minus the segment
//!     being typed, is the lookup key into the completion dictionary.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::report::split_lines;

static KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z0-9_.]+)\s*=").unwrap());

/// Number of distinct segment ranks.
pub const MAX_KEY_RANKS: usize = 8;

/// One classified key segment. Columns and lengths are in characters; keys are ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyToken {
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub rank: usize,
}

/// Classify the key segments of one line.
///
/// Lines without a leading `key =` produce no tokens. Empty segments (`a..b`) still occupy
/// their rank and produce zero-length tokens.
pub fn tokenize_line(line_index: usize, line: &str) -> Vec<KeyToken> {
    let Some(key) = KEY.captures(line).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };

    let mut tokens = Vec::new();
    let mut column = 0;
    for (rank, segment) in key.as_str().split('.').enumerate() {
        if rank < MAX_KEY_RANKS {
            tokens.push(KeyToken {
                line: line_index,
                column,
                length: segment.len(),
                rank,
            });
        }
        column += segment.len() + 1;
    }
    tokens
}

/// Classify every line of a document, in line order.
pub fn tokenize_text(text: &str) -> Vec<KeyToken> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .flat_map(|(index, line)| tokenize_line(index, line))
        .collect()
}

/// Dictionary key for completing at the end of `before_cursor`.
///
/// `before_cursor` is the current line from column 0 up to the cursor. Segments are trimmed,
/// the last (in-progress) one is dropped and the rest are joined with `.`. Text without any
/// `.` yields the empty prefix, which addresses top-level keys.
pub fn completion_prefix(before_cursor: &str) -> String {
    let segments: Vec<&str> = before_cursor.split('.').map(str::trim).collect();
    segments[..segments.len() - 1].join(".")
}
