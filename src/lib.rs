//! # ntfy-hub-mcp
//!
//! `ntfy-hub-mcp` lets an LLM agent reach a human through [ntfy](https://ntfy.sh):
//! it can push a notification to a topic and block until the human answers on
//! another topic. Both operations are exposed as MCP tools over stdio.
//!
//! ## Core Modules
//!
//! - `client`: HTTP client for ntfy (publish, subscribe, wait for one message).
//! - `config`: Loads the server URL and default topics from file and environment.
//! - `transport`: The MCP server handler exposing `ntfy_publish` and `ntfy_wait_for_reply`.
//! - `utils`: Error type and logging setup.

pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

pub use client::{Message, NtfyClient};
pub use utils::error::{NtfyError, Result};
