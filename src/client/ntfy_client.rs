//! HTTP client for a ntfy server
//!
//! `NtfyClient` holds the base URL and a `reqwest::Client`. It carries no
//! mutable state, so clones can be used from any number of tasks at once;
//! connection pooling is left to `reqwest`.
//!
//! Every call opens at most one request and releases it before returning.
//! Waiting calls observe the caller's deadline and cancellation token: the
//! losing side of the `select!` drops the response, which closes the socket
//! and unblocks the pending read.

use futures_util::StreamExt;
use reqwest::StatusCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::message::Message;
use super::stream::{MessageStream, message_stream};
use crate::utils::error::{NtfyError, Result};

/// Public ntfy instance used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://ntfy.sh";

const TITLE_HEADER: &str = "Title";

#[derive(Debug, Clone)]
pub struct NtfyClient {
    base_url: String,
    http: reqwest::Client,
}

impl NtfyClient {
    /// Create a client for `base_url`, falling back to [`DEFAULT_BASE_URL`]
    /// when it is empty.
    pub fn new(base_url: &str) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Same as [`NtfyClient::new`] with a caller-provided transport.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Self {
        let base_url = match base_url.trim_end_matches('/') {
            "" => DEFAULT_BASE_URL,
            trimmed => trimmed,
        };
        Self {
            base_url: base_url.to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{topic}`, or `{base}/{topic}/json` for the streaming endpoint.
    fn topic_url(&self, topic: &str, json_stream: bool) -> Result<Url> {
        let mut raw = format!("{}/{}", self.base_url, topic);
        if json_stream {
            raw.push_str("/json");
        }
        Url::parse(&raw).map_err(|source| NtfyError::InvalidUrl { url: raw, source })
    }

    /// Publish `message` to `topic`. A non-empty `title` goes into the
    /// `Title` header. Only a 200 response counts as success.
    pub async fn publish(&self, topic: &str, message: &str, title: &str) -> Result<()> {
        let url = self.topic_url(topic, false)?;

        let mut request = self.http.post(url).body(message.to_owned());
        if !title.is_empty() {
            request = request.header(TITLE_HEADER, title);
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(topic, status = status.as_u16(), "publish rejected");
            return Err(NtfyError::Status(status));
        }

        debug!(topic, bytes = message.len(), "published message");
        Ok(())
    }

    /// Open the JSON stream of `topic`.
    async fn open_stream(&self, topic: &str) -> Result<MessageStream> {
        let url = self.topic_url(topic, true)?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(topic, status = status.as_u16(), "subscribe rejected");
            return Err(NtfyError::Status(status));
        }

        debug!(topic, "subscribed");
        Ok(message_stream(response.bytes_stream()))
    }

    /// Deliver every message event on `topic` to `on_message` until the
    /// server closes the stream or `cancel` fires.
    ///
    /// Clean closure and cancellation both return `Ok(())`; a failed read
    /// returns its error. There is no reconnect.
    pub async fn subscribe<F>(
        &self,
        topic: &str,
        cancel: &CancellationToken,
        mut on_message: F,
    ) -> Result<()>
    where
        F: FnMut(Message),
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(topic, "subscription cancelled");
                Ok(())
            }
            result = self.pump(topic, &mut on_message) => {
                debug!(topic, ok = result.is_ok(), "subscription ended");
                result
            }
        }
    }

    async fn pump<F>(&self, topic: &str, on_message: &mut F) -> Result<()>
    where
        F: FnMut(Message),
    {
        let mut messages = self.open_stream(topic).await?;
        while let Some(message) = messages.next().await {
            on_message(message?);
        }
        Ok(())
    }

    /// Wait for the first message event on `topic`.
    ///
    /// The connection is dropped as soon as one arrives. Errors:
    /// - [`NtfyError::DeadlineExceeded`] when `deadline` passes first
    /// - [`NtfyError::Cancelled`] when `cancel` fires first
    /// - [`NtfyError::NoMessage`] when the server closes the stream without one
    pub async fn subscribe_once(
        &self,
        topic: &str,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NtfyError::Cancelled),
            _ = tokio::time::sleep_until(deadline) => Err(NtfyError::DeadlineExceeded),
            result = self.first_message(topic) => result,
        }
    }

    async fn first_message(&self, topic: &str) -> Result<Message> {
        let mut messages = self.open_stream(topic).await?;
        match messages.next().await {
            Some(Ok(message)) => {
                debug!(topic, id = %message.id, received_at = ?message.received_at(), "received message");
                Ok(message)
            }
            Some(Err(err)) => Err(err),
            None => Err(NtfyError::NoMessage),
        }
    }
}
