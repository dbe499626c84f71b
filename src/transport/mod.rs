//! The `transport` module exposes the ntfy client to an agent as MCP tools.
//!
//! It defines the tool argument types and the `NtfyTools` server handler,
//! which validates tool calls, forwards them to `NtfyClient` and turns the
//! outcome into tool results. The binary serves it over stdio.

pub mod mcp;
pub mod message;


pub use mcp::{NtfyTools, ToolSettings};
pub use message::{PublishArgs, WaitForReplyArgs};
