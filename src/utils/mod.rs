//! The `utils` module provides shared definitions used across `ntfy-hub-mcp`.
//!
//! It centralizes the crate error type and the logging setup so the client,
//! the tool adapter and the binary report failures the same way.

pub mod error;
pub mod logging;

#[cfg(test)]
pub(crate) mod fake_ntfy;
