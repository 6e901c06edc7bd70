//! # mindes-parser
//!
//! Text-to-structure extraction for MInDes input reports and dotted-key
//! classification for MInDes documents.
//!
//! Layout
//!
//!     report     The input-report pipeline, leaf first:
//!         classify    Stateless per-line matchers (section markers, table headers, rows, prompts).
//!         sections    The section state machine: a fold over lines driven by a transition table.
//!         model       The six-bucket [`Report`] the fold produces.
//!         extract     Derived views over a report (raw input, full input, token rows).
//!         loader      Reading reports from disk or memory.
//!
//!     keys       Dotted-key tokenizer (`a.b.c = 1`) and completion-prefix resolution.
//!
//! Every pass is a full pass over the whole text; nothing here keeps state across calls.

pub mod keys;
pub mod report;

pub use keys::{completion_prefix, tokenize_line, tokenize_text, KeyToken, MAX_KEY_RANKS};
pub use report::extract::{
    default_output_path, extract_full_input, extract_raw_input, extract_token_rows, ExtractError,
    Extraction, MalformedRow, TokenRow,
};
pub use report::loader::{LoaderError, ReportLoader};
pub use report::model::{Bucket, Report};
pub use report::sections::parse_report;
