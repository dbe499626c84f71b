use serde::Deserialize;

use crate::client::DEFAULT_BASE_URL;

/// Configuration settings for the application.
///
/// Holds the ntfy server location, the two default topics used by the tools,
/// and the log level.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the ntfy server.
    pub url: String,
    /// Topic that `ntfy_publish` and wait prompts go to.
    pub topic_out: String,
    /// Topic that `ntfy_wait_for_reply` listens on.
    pub topic_in: String,
    pub log_level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub url: Option<String>,
    pub topic_out: Option<String>,
    pub topic_in: Option<String>,
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            topic_out: "agent-output".to_string(),
            topic_in: "agent-input".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PartialSettings {
    /// Fill every unset field from `defaults`.
    pub fn merge(self, defaults: Settings) -> Settings {
        Settings {
            url: self.url.unwrap_or(defaults.url),
            topic_out: self.topic_out.unwrap_or(defaults.topic_out),
            topic_in: self.topic_in.unwrap_or(defaults.topic_in),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        }
    }
}
