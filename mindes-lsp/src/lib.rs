//! Language Server Protocol (LSP) implementation for MInDes
//!
//!     This crate provides editor support for MInDes input files and the `input_report.txt`
//!     dumps the solver writes, in any LSP-compatible editor.
//!
//! Feature Set
//!
//!     1. Semantic Tokens (textDocument/semanticTokens/full):
//!         - Every `key.sub.sub = value` line gets one token per key segment
//!         - The legend is `subkey1`..`subkey8`; deeper segments stay unhighlighted
//!         - Can be switched off through the `MInDesServer.semanticHighlighting` setting
//!
//!     2. Completion (textDocument/completion, completionItem/resolve):
//!         - Triggered on `.`; the typed key prefix is looked up in a static dictionary
//!         - The dictionary is loaded once at startup; a missing one leaves completion empty
//!
//!     3. Commands (workspace/executeCommand):
//!         - `mindes.extractRawInput`: inputs table content of a report, as a `.mindes` file
//!         - `mindes.extractFullInput`: echoed prompts and comments of a report
//!
//!     Diagnostics are not produced.
//!
//! Architecture
//!
//!     LSP Layer (tower-lsp):
//!         - JSON-RPC transport, capability negotiation, request routing
//!
//!     Server Layer ([server]):
//!         - Implements LanguageServer, keeps the open documents' text
//!         - Thin: converts protocol types and calls the feature layer
//!
//!     Feature Layer ([features]):
//!         - Stateless functions over document text, backed by mindes-parser
//!         - All logic and dense unit tests
//!
//! Usage
//!
//!     $ mindes-lsp [--config <file>]
//!     Starts the language server on stdin/stdout. Logs go to stderr, filtered by RUST_LOG.

pub mod features;
pub mod server;

pub use server::MindesLanguageServer;
