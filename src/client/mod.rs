//! The `client` module talks to a ntfy server over HTTP.
//!
//! It provides `NtfyClient` (publish, continuous subscribe, single-message
//! wait), the `Message` record decoded from the topic's JSON stream, and the
//! line parser that turns the response body into a stream of messages.

pub mod message;
pub mod ntfy_client;
pub mod stream;

pub use message::{Event, Message};
pub use ntfy_client::{DEFAULT_BASE_URL, NtfyClient};
