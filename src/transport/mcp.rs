//! MCP server handler
//!
//! `NtfyTools` maps two tool calls onto `NtfyClient`:
//! - `ntfy_publish`: send a notification
//! - `ntfy_wait_for_reply`: optionally send a prompt, then block until a
//!   message arrives on the inbound topic or the timeout passes
//!
//! Client failures never become protocol errors. They are reported as tool
//! results flagged `is_error`, so the agent sees the text and can decide what
//! to do next.

use std::time::Duration;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::message::{PublishArgs, WaitForReplyArgs};
use crate::client::NtfyClient;
use crate::config::Settings;
use crate::utils::error::NtfyError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Longest wait accepted; larger requests are clamped.
const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound on the prompt publish. Not tied to `timeout_seconds`: a zero
/// second wait still sends its prompt.
const PROMPT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Title of the notification sent for a `prompt`.
pub const PROMPT_TITLE: &str = "Instruction Requested";

const MESSAGE_REQUIRED: &str = "message is required";

/// Default topics for calls that do not name one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub topic_out: String,
    pub topic_in: String,
}

impl From<&Settings> for ToolSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            topic_out: settings.topic_out.clone(),
            topic_in: settings.topic_in.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NtfyTools {
    client: NtfyClient,
    settings: ToolSettings,
    shutdown: CancellationToken,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl NtfyTools {
    pub fn new(client: NtfyClient, settings: ToolSettings) -> Self {
        Self {
            client,
            settings,
            shutdown: CancellationToken::new(),
            tool_router: Self::tool_router(),
        }
    }

    /// Token that aborts every in-flight wait when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    #[tool(
        name = "ntfy_publish",
        description = "Send a message to a ntfy topic (e.g., for notifications)"
    )]
    pub async fn publish(
        &self,
        Parameters(args): Parameters<PublishArgs>,
    ) -> Result<CallToolResult, McpError> {
        if args.message.is_empty() {
            return Ok(error_result(MESSAGE_REQUIRED));
        }

        let topic = pick_topic(args.topic, &self.settings.topic_out);
        let title = args.title.unwrap_or_default();

        match self.client.publish(&topic, &args.message, &title).await {
            Ok(()) => {
                info!(%topic, "message published");
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Message sent to topic '{topic}'"
                ))]))
            }
            Err(err) => {
                warn!(%topic, error = %err, "publish failed");
                Ok(error_result(format!("Failed to publish to ntfy: {err}")))
            }
        }
    }

    #[tool(
        name = "ntfy_wait_for_reply",
        description = "Wait for a reply from the human on a specific topic. Use this to get user input or approval."
    )]
    pub async fn wait_for_reply(
        &self,
        Parameters(args): Parameters<WaitForReplyArgs>,
    ) -> Result<CallToolResult, McpError> {
        let topic = pick_topic(args.topic, &self.settings.topic_in);
        let timeout_secs = timeout_secs(args.timeout_seconds);
        let timeout = Duration::from_secs(timeout_secs);

        if let Some(prompt) = args.prompt.filter(|p| !p.is_empty()) {
            self.send_prompt(&prompt).await;
        }

        let deadline = Instant::now() + timeout;
        let cancel = self.shutdown.child_token();
        info!(%topic, timeout_secs, "waiting for reply");

        match self.client.subscribe_once(&topic, deadline, &cancel).await {
            Ok(message) => {
                info!(%topic, id = %message.id, "reply received");
                Ok(CallToolResult::success(vec![Content::text(message.body)]))
            }
            Err(NtfyError::DeadlineExceeded) => {
                info!(%topic, timeout_secs, "no reply before timeout");
                Ok(error_result(format!(
                    "Timed out waiting for reply on topic '{topic}' after {timeout_secs} seconds"
                )))
            }
            Err(err) => {
                warn!(%topic, error = %err, "wait for reply failed");
                Ok(error_result(format!("Error waiting for reply: {err}")))
            }
        }
    }
}

impl NtfyTools {
    /// Best-effort prompt notification. Failures are logged and otherwise
    /// ignored so the wait still happens.
    async fn send_prompt(&self, prompt: &str) {
        let topic = &self.settings.topic_out;
        let sent = tokio::time::timeout(
            PROMPT_PUBLISH_TIMEOUT,
            self.client.publish(topic, prompt, PROMPT_TITLE),
        );
        match sent.await {
            Ok(Ok(())) => debug!(%topic, "prompt sent"),
            Ok(Err(err)) => warn!(%topic, error = %err, "prompt not sent, waiting anyway"),
            Err(_) => warn!(%topic, "prompt publish timed out, waiting anyway"),
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for NtfyTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build()).with_instructions(
            format!(
                "Notify a human through ntfy and collect their replies. \
                 ntfy_publish sends to '{}' by default; ntfy_wait_for_reply listens on '{}'.",
                self.settings.topic_out, self.settings.topic_in
            ),
        )
    }
}

fn error_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

/// The requested topic, or `default` when absent or empty.
fn pick_topic(requested: Option<String>, default: &str) -> String {
    requested
        .filter(|topic| !topic.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Whole seconds to wait. Fractions are truncated, negatives clamp to zero and
/// non-finite values fall back to the default.
pub(crate) fn timeout_secs(requested: Option<f64>) -> u64 {
    match requested {
        Some(secs) if secs.is_finite() => (secs.max(0.0) as u64).min(MAX_TIMEOUT_SECS),
        _ => DEFAULT_TIMEOUT_SECS,
    }
}
