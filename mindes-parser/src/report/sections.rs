//! Section state machine
//!
//!     The parser is a fold over the report's lines. At each line two independent rules run:
//!
//!         1. Prompt capture: if the line is a prompt (see [`classify::prompt`]) the whole line
//!            is recorded in the `prompts` bucket. This ignores the section state.
//!
//!         2. Section transition: the line's [`LineClass`] and the current [`SectionState`] go
//!            through [`transition`], which yields the next state and one [`Action`].
//!
//!     Transition table (first row that applies wins):
//!
//!         class                  state          next            action
//!         SectionStart(MACRO)    any            Macros          discard
//!         SectionStart(DEBUG)    any            Debug           discard
//!         SectionStart(other)    any            None            discard
//!         SectionEnd             any            None            discard
//!         any                    Macros         Macros          store macros
//!         TableHeader(kind)      Debug          Table(kind)     skip next line
//!         any                    Debug          Debug           discard
//!         Separator              Table(kind)    Debug           discard
//!         any                    Table(kind)    Table(kind)     store kind
//!         any                    None           None            discard
//!
//!     The header skip is unconditional: the line after a header is assumed to be the table's
//!     dashed rule and is never looked at, not even for prompt capture. A report that omits the
//!     rule loses its first data row.

use super::classify::{self, LineClass, TableKind, DEBUG_LABEL, MACRO_LABEL};
use super::model::{Bucket, Report};
use super::split_lines;

/// Where the parser currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    /// Outside any known section; lines are dropped.
    #[default]
    None,
    Macros,
    /// Inside a debug block, between tables.
    Debug,
    Table(TableKind),
}

/// What to do with the line that produced a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Discard,
    Store(Bucket),
    /// Drop this line and the one after it.
    SkipNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub next: SectionState,
    pub action: Action,
}

impl Step {
    fn new(next: SectionState, action: Action) -> Self {
        Self { next, action }
    }
}

pub fn transition(state: SectionState, class: LineClass<'_>) -> Step {
    use SectionState::*;

    match (class, state) {
        (LineClass::SectionStart(MACRO_LABEL), _) => Step::new(Macros, Action::Discard),
        (LineClass::SectionStart(DEBUG_LABEL), _) => Step::new(Debug, Action::Discard),
        (LineClass::SectionStart(_), _) | (LineClass::SectionEnd, _) => {
            Step::new(None, Action::Discard)
        }
        (_, Macros) => Step::new(Macros, Action::Store(Bucket::Macros)),
        (LineClass::TableHeader(kind), Debug) => Step::new(Table(kind), Action::SkipNext),
        (_, Debug) => Step::new(Debug, Action::Discard),
        (LineClass::Separator, Table(_)) => Step::new(Debug, Action::Discard),
        (_, Table(kind)) => Step::new(Table(kind), Action::Store(kind.into())),
        (_, None) => Step::new(None, Action::Discard),
    }
}

/// Parse a whole report into its buckets.
pub fn parse_report(text: &str) -> Report {
    parse_lines(&split_lines(text))
}

/// Parse already split lines. Each call starts from [`SectionState::None`].
pub fn parse_lines(lines: &[&str]) -> Report {
    let mut report = Report::default();
    let mut state = SectionState::default();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];

        if classify::prompt(line).is_some() {
            report.push(Bucket::Prompts, line);
        }

        let step = transition(state, classify::classify(line));
        if step.next != state {
            tracing::debug!(line = index, from = ?state, to = ?step.next, "section transition");
        }
        state = step.next;

        match step.action {
            Action::Discard => {}
            Action::Store(bucket) => report.push(bucket, line),
            Action::SkipNext => {
                tracing::debug!(line = index + 1, "skipping table rule after header");
                index += 1;
            }
        }
        index += 1;
    }

    report
}
