//! The report model: six ordered buckets of raw lines.

use serde::Serialize;
use std::fmt;

use super::classify::TableKind;

/// Named bucket of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Macros,
    Inputs,
    Tokens,
    Variables,
    Functions,
    Prompts,
}

pub const BUCKETS: &[Bucket] = &[
    Bucket::Macros,
    Bucket::Inputs,
    Bucket::Tokens,
    Bucket::Variables,
    Bucket::Functions,
    Bucket::Prompts,
];

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Macros => "macros",
            Bucket::Inputs => "inputs",
            Bucket::Tokens => "tokens",
            Bucket::Variables => "variables",
            Bucket::Functions => "functions",
            Bucket::Prompts => "prompts",
        }
    }
}

impl From<TableKind> for Bucket {
    fn from(kind: TableKind) -> Self {
        match kind {
            TableKind::Inputs => Bucket::Inputs,
            TableKind::Variables => Bucket::Variables,
            TableKind::Functions => Bucket::Functions,
            TableKind::Tokens => Bucket::Tokens,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lines of an input report sorted into buckets, each in document order.
///
/// A line lands in at most one of the section buckets; the `prompts` bucket is filled by an
/// independent rule, so a prompt line may appear there as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub macros: Vec<String>,
    pub inputs: Vec<String>,
    pub tokens: Vec<String>,
    pub variables: Vec<String>,
    pub functions: Vec<String>,
    pub prompts: Vec<String>,
}

impl Report {
    pub fn get(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Macros => &self.macros,
            Bucket::Inputs => &self.inputs,
            Bucket::Tokens => &self.tokens,
            Bucket::Variables => &self.variables,
            Bucket::Functions => &self.functions,
            Bucket::Prompts => &self.prompts,
        }
    }

    pub(crate) fn push(&mut self, bucket: Bucket, line: &str) {
        let lines = match bucket {
            Bucket::Macros => &mut self.macros,
            Bucket::Inputs => &mut self.inputs,
            Bucket::Tokens => &mut self.tokens,
            Bucket::Variables => &mut self.variables,
            Bucket::Functions => &mut self.functions,
            Bucket::Prompts => &mut self.prompts,
        };
        lines.push(line.to_string());
    }

    /// Iterate buckets in their canonical order.
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &[String])> {
        BUCKETS.iter().map(move |bucket| (*bucket, self.get(*bucket)))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets().all(|(_, lines)| lines.is_empty())
    }
}
