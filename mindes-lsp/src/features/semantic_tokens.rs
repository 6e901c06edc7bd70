use mindes_parser::keys::{tokenize_text, KeyToken, MAX_KEY_RANKS};
use tower_lsp::lsp_types::SemanticToken;

/// Legend entries, one per key segment rank.
pub const SUBKEY_TOKEN_TYPES: [&str; MAX_KEY_RANKS] = [
    "subkey1", "subkey2", "subkey3", "subkey4", "subkey5", "subkey6", "subkey7", "subkey8",
];

/// A key segment ready for the wire: single line, legend index = rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MindesSemanticToken {
    pub line: u32,
    pub start: u32,
    pub length: u32,
    pub token_type: u32,
}

impl From<KeyToken> for MindesSemanticToken {
    fn from(token: KeyToken) -> Self {
        Self {
            line: token.line as u32,
            start: token.column as u32,
            length: token.length as u32,
            token_type: token.rank as u32,
        }
    }
}

impl MindesSemanticToken {
    pub fn type_name(&self) -> &'static str {
        SUBKEY_TOKEN_TYPES[self.token_type as usize]
    }
}

pub fn collect_semantic_tokens(text: &str) -> Vec<MindesSemanticToken> {
    tokenize_text(text).into_iter().map(Into::into).collect()
}

/// Delta-encode tokens that are already in document order.
///
/// Zero-length tokens (empty segments such as `a..b`) are dropped, since editors reject them.
pub fn encode_semantic_tokens(tokens: &[MindesSemanticToken]) -> Vec<SemanticToken> {
    let mut data = Vec::with_capacity(tokens.len());
    let mut prev_line = 0u32;
    let mut prev_start = 0u32;

    for token in tokens.iter().filter(|token| token.length > 0) {
        let delta_line = token.line - prev_line;
        let delta_start = if delta_line == 0 {
            token.start - prev_start
        } else {
            token.start
        };
        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.token_type,
            token_modifiers_bitset: 0,
        });
        prev_line = token.line;
        prev_start = token.start;
    }

    data
}
