//! Message definitions for the ntfy JSON stream
//!
//! `Message` mirrors one JSON object of the `/{topic}/json` endpoint. Field
//! names on the wire are fixed by the service:
//!
//! - `id`: opaque message id, empty if the server omitted it
//! - `time`: seconds since UNIX epoch, assigned by the server
//! - `event`: record kind; only `message` carries a payload
//! - `topic`: topic the record arrived on
//! - `message`: notification text
//! - `title`, `tags`: optional metadata
//!
//! Absent fields decode to their defaults so partial records still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a stream record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Open,
    Keepalive,
    Message,
    PollRequest,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    #[serde(rename = "time")]
    pub timestamp: i64,
    pub event: Event,
    pub topic: String,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Message {
    /// Whether this record carries a notification payload.
    pub fn is_payload(&self) -> bool {
        self.event == Event::Message
    }

    /// Server timestamp as a UTC date-time, `None` if out of range.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
