//! Line classification
//!
//!     Every matcher here looks at one line and nothing else. None of them fail: a line
//!     that does not have the expected shape simply yields `None` / `false`.
//!
//!     [`classify`] folds the structural matchers into a single [`LineClass`] using a fixed
//!     priority: section start, section end, table header, table separator, plain text.
//!     Prompt detection is deliberately not part of that verdict, because a prompt line is
//!     collected in addition to whatever its structural class says (see [`prompt`]).

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+\s*([A-Z ]+)\s*=+$").unwrap());
static SECTION_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+$").unwrap());
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+$").unwrap());
static RAW_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+.*\|.*\|(.*)$").unwrap());
static TOKEN_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[0-9]+.*\|.*\|\{"(.*)"\}, \{"(.*)"\}, \{"(.*)"\}$"#).unwrap()
});
static PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>\s*\[.*\]\s(.*)|^\s*(#.*)$").unwrap());

/// Table header patterns inside a debug block, in the order they are tried.
///
/// The generic `NO.` pattern must stay last: it also matches the variables and functions
/// headers.
static TABLE_HEADERS: Lazy<[(TableKind, Regex); 4]> = Lazy::new(|| {
    [
        (TableKind::Inputs, Regex::new(r"^LINE\s+PROPERTY\s+\|CONTENT").unwrap()),
        (TableKind::Variables, Regex::new(r"^NO\.\s+VARIABLE\s+\|VALUE").unwrap()),
        (TableKind::Functions, Regex::new(r"^NO\.\s+FUNCTIONS\s+\|CONTENT").unwrap()),
        (TableKind::Tokens, Regex::new(r"^NO\.\s+.*\|.*$").unwrap()),
    ]
});

pub const MACRO_LABEL: &str = "M A C R O";
pub const DEBUG_LABEL: &str = "D E B U G";

/// The typed tables a debug block can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Inputs,
    Variables,
    Functions,
    Tokens,
}

/// Structural verdict for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// `===== LABEL =====`, carrying the trimmed label (possibly empty).
    SectionStart(&'a str),
    /// A bare run of `=`.
    SectionEnd,
    /// A recognized table header row.
    TableHeader(TableKind),
    /// A bare run of `-`.
    Separator,
    /// Anything else.
    Text,
}

/// Which prompt alternative matched, with its captured text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt<'a> {
    /// `> [tag] text`, capturing `text`.
    Echoed(&'a str),
    /// A line whose trimmed content starts with `#`, capturing from the `#` on.
    Comment(&'a str),
}

impl<'a> Prompt<'a> {
    pub fn text(self) -> &'a str {
        match self {
            Prompt::Echoed(text) | Prompt::Comment(text) => text,
        }
    }
}

pub fn classify(line: &str) -> LineClass<'_> {
    if let Some(label) = section_start(line) {
        return LineClass::SectionStart(label);
    }
    if is_section_end(line) {
        return LineClass::SectionEnd;
    }
    if let Some(kind) = table_header(line) {
        return LineClass::TableHeader(kind);
    }
    if is_separator(line) {
        return LineClass::Separator;
    }
    LineClass::Text
}

/// Trimmed label of a `===== LABEL =====` line.
pub fn section_start(line: &str) -> Option<&str> {
    SECTION_START
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|label| label.as_str().trim())
}

pub fn is_section_end(line: &str) -> bool {
    SECTION_END.is_match(line)
}

pub fn is_separator(line: &str) -> bool {
    SEPARATOR.is_match(line)
}

/// First table header pattern matching `line`, in priority order.
pub fn table_header(line: &str) -> Option<TableKind> {
    TABLE_HEADERS
        .iter()
        .find(|(_, pattern)| pattern.is_match(line))
        .map(|(kind, _)| *kind)
}

/// Content after the last `|` of a numbered table row.
pub fn raw_row_content(line: &str) -> Option<&str> {
    RAW_ROW
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|content| content.as_str())
}

/// The three `{"..."}` cells of a numbered token row.
pub fn token_row_cells(line: &str) -> Option<[&str; 3]> {
    let caps = TOKEN_ROW.captures(line)?;
    Some([
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
    ])
}

pub fn prompt(line: &str) -> Option<Prompt<'_>> {
    let caps = PROMPT.captures(line)?;
    if let Some(text) = caps.get(1) {
        return Some(Prompt::Echoed(text.as_str()));
    }
    caps.get(2).map(|text| Prompt::Comment(text.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_start_extracts_trimmed_label() {
        assert_eq!(section_start("===== M A C R O ====="), Some("M A C R O"));
        assert_eq!(section_start("==D E B U G=="), Some("D E B U G"));
        assert_eq!(section_start("=====   ====="), Some(""));
        assert_eq!(section_start("====="), None);
        assert_eq!(section_start("===== macro ====="), None);
    }

    #[test]
    fn bare_equals_run_is_section_end_not_start() {
        assert_eq!(classify("=========="), LineClass::SectionEnd);
        assert_eq!(classify("== X =="), LineClass::SectionStart("X"));
        assert!(!is_section_end("===x"));
    }

    #[test]
    fn specific_headers_win_over_generic() {
        assert_eq!(
            table_header("LINE   PROPERTY        |CONTENT"),
            Some(TableKind::Inputs)
        );
        assert_eq!(
            table_header("NO.  VARIABLE      |VALUE"),
            Some(TableKind::Variables)
        );
        assert_eq!(
            table_header("NO.  FUNCTIONS     |CONTENT"),
            Some(TableKind::Functions)
        );
        assert_eq!(
            table_header("NO.  NAME  |VALUE  |SOURCE"),
            Some(TableKind::Tokens)
        );
        assert_eq!(table_header("LINE CONTENT"), None);
        assert_eq!(table_header("NO. without pipe"), None);
    }

    #[test]
    fn separators_are_dash_runs_only() {
        assert!(is_separator("-------"));
        assert!(!is_separator("--- x"));
        assert!(!is_separator(""));
        assert_eq!(classify("----"), LineClass::Separator);
    }

    #[test]
    fn raw_row_takes_field_after_last_pipe() {
        assert_eq!(
            raw_row_content("12   Solver.Loop   |  3 |Solver.Loop.end_step = 100"),
            Some("Solver.Loop.end_step = 100")
        );
        assert_eq!(raw_row_content("1|a|"), Some(""));
        assert_eq!(raw_row_content("x|a|b"), None);
        assert_eq!(raw_row_content("1 only|one pipe"), None);
    }

    #[test]
    fn token_row_splits_three_cells() {
        assert_eq!(
            token_row_cells(r#"3  tok |  |{"Nx"}, {"64"}, {"Solver.Mesh"}"#),
            Some(["Nx", "64", "Solver.Mesh"])
        );
        assert_eq!(token_row_cells("3  tok | |Nx, 64"), None);
    }

    #[test]
    fn row_numbers_are_ascii_digits() {
        assert_eq!(raw_row_content("\u{661} |a |x = 1"), None);
        assert_eq!(raw_row_content("\u{ff11} |a |x = 1"), None);
        assert_eq!(
            token_row_cells("\u{661} tok |  |{\"Nx\"}, {\"64\"}, {\"Solver.Mesh\"}"),
            None
        );
    }

    #[test]
    fn prompt_exposes_matching_alternative() {
        assert_eq!(
            prompt("> [Solver] Solver.Loop.end_step = 100"),
            Some(Prompt::Echoed("Solver.Loop.end_step = 100"))
        );
        assert_eq!(
            prompt("   # phase field settings"),
            Some(Prompt::Comment("# phase field settings"))
        );
        assert_eq!(prompt("plain text"), None);
        assert_eq!(prompt("> no brackets"), None);
    }
}
