use mindes_config::MindesConfig;
use serde::Deserialize;
use serde_json::Value;

/// Name of the client-side configuration section.
pub const SETTINGS_SECTION: &str = "MInDesServer";

/// Server behaviour the client may change at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub semantic_highlighting: bool,
    pub output_extension: String,
}

impl ServerSettings {
    pub fn from_config(config: &MindesConfig) -> Self {
        Self {
            semantic_highlighting: config.highlighting.enabled,
            output_extension: config.extract.output_extension.clone(),
        }
    }

    /// Apply a `didChangeConfiguration` / `initializationOptions` payload.
    ///
    /// The payload carries the whole `MInDesServer` section; keys it omits fall back to
    /// `defaults`, and a payload without the section resets to `defaults` entirely. Returns
    /// `false` when the section is present but malformed, leaving `self` untouched.
    pub fn apply(&mut self, payload: &Value, defaults: &ServerSettings) -> bool {
        let Some(section) = payload.get(SETTINGS_SECTION) else {
            *self = defaults.clone();
            return true;
        };
        match ClientSettings::deserialize(section) {
            Ok(client) => {
                *self = ServerSettings {
                    semantic_highlighting: client
                        .semantic_highlighting
                        .unwrap_or(defaults.semantic_highlighting),
                    output_extension: client
                        .output_extension
                        .unwrap_or_else(|| defaults.output_extension.clone()),
                };
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed {} settings", SETTINGS_SECTION);
                false
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientSettings {
    semantic_highlighting: Option<bool>,
    output_extension: Option<String>,
}
