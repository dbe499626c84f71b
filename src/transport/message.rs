//! Argument types of the MCP tools.
//!
//! The JSON schemas advertised to the agent are derived from these structs,
//! so the doc comments double as parameter descriptions.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct PublishArgs {
    /// The message content to send
    pub message: String,
    /// The topic to publish to (defaults to the configured outbound topic)
    #[serde(default)]
    pub topic: Option<String>,
    /// Optional title for the notification
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct WaitForReplyArgs {
    /// The topic to listen on (defaults to the configured inbound topic)
    #[serde(default)]
    pub topic: Option<String>,
    /// How long to wait for a reply in seconds (default: 60)
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
    /// Optional message to send to the human before waiting for a reply
    #[serde(default)]
    pub prompt: Option<String>,
}
