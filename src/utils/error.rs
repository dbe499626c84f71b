//! Error types for the ntfy client.
//!
//! Every failure mode a caller has to tell apart gets its own variant, so the
//! tool adapter can match on the kind instead of inspecting message text.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NtfyError>;

#[derive(Debug, Error)]
pub enum NtfyError {
    /// The target URL could not be built from the base URL and topic.
    #[error("invalid request url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, DNS, TLS or body read failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK.
    #[error("server responded with status {}", .0.as_u16())]
    Status(StatusCode),

    /// The deadline passed before a message arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("subscription cancelled")]
    Cancelled,

    /// The stream closed before any message event was seen.
    #[error("no message received")]
    NoMessage,
}

impl NtfyError {
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, NtfyError::DeadlineExceeded)
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NtfyError::Status(status) => Some(*status),
            NtfyError::Transport(err) => err.status(),
            _ => None,
        }
    }
}
