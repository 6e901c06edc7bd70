//! Input report parsing
//!
//!     An `input_report.txt` is a plaintext dump written by the MInDes solver. It interleaves
//!     free-form log text with `=`-delimited sections. Two section labels matter:
//!
//!         `M A C R O`   every line up to the closing `=====` is a macro definition.
//!         `D E B U G`   a sequence of pipe-delimited tables (inputs, tokens, variables,
//!                       functions), each introduced by a header row and a dashed rule and
//!                       closed by another dashed rule.
//!
//!     Independently of any section, lines that look like echoed prompts (`> [..] text`) or
//!     comments (`# text`) are collected so the original input file can be rebuilt.
//!
//!     Parsing is purely lexical: each line is classified on its own (see [classify]) and the
//!     [sections] state machine decides what to do with it given the current section.

pub mod classify;
pub mod extract;
pub mod loader;
pub mod model;
pub mod sections;

/// Split report text on `\n` or `\r\n`.
///
/// A trailing line terminator yields a final empty line, matching how editors count lines.
/// A lone `\r` is only a terminator when a `\n` follows it.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let terminated = lines.len() - 1;
    for line in &mut lines[..terminated] {
        *line = line.strip_suffix('\r').unwrap_or(line);
    }
    lines
}
