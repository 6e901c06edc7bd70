pub mod commands;
pub mod completion;
pub mod semantic_tokens;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;
