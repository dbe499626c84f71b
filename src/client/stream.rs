//! Line-delimited JSON stream parsing
//!
//! The `/{topic}/json` endpoint answers with one JSON object per line and keeps
//! the connection open. TCP chunks do not line up with records: a chunk can
//! carry several lines or end in the middle of one, so bytes are buffered
//! until a newline arrives.
//!
//! Lines that are empty, not JSON, or not a `message` event are dropped here.
//! The resulting stream only yields payload messages and ends when the
//! underlying connection does. It cannot be restarted; a new subscription
//! needs a new request.

use std::collections::VecDeque;
use std::mem;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::unfold;
use futures_util::{Stream, StreamExt};
use tracing::{trace, warn};

use super::message::Message;
use crate::utils::error::{NtfyError, Result};

/// Boxed stream of payload messages read from one connection.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Longest line kept, in bytes. Longer lines are dropped whole.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Accumulates raw bytes and splits them into complete lines.
///
/// Only the unfinished tail is buffered and each incoming byte is scanned
/// once. A line that grows past the limit is discarded up to its newline and
/// the lines after it are unaffected.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    max_line: usize,
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line,
            discarding: false,
        }
    }

    /// Bytes currently held for an unfinished line.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append a chunk and return every line it completed, without the
    /// terminator. A trailing partial line stays buffered.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let (head, tail) = (&rest[..pos], &rest[pos + 1..]);
            rest = tail;
            // the newline that closes an oversized line
            if mem::take(&mut self.discarding) {
                continue;
            }
            if self.buffer.len() + head.len() > self.max_line {
                self.drop_line(self.buffer.len() + head.len());
            } else {
                self.buffer.extend_from_slice(head);
                lines.push(mem::take(&mut self.buffer));
            }
        }

        if !self.discarding {
            if self.buffer.len() + rest.len() > self.max_line {
                self.drop_line(self.buffer.len() + rest.len());
                self.discarding = true;
            } else {
                self.buffer.extend_from_slice(rest);
            }
        }
        lines
    }

    /// Take whatever is left once the byte stream has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.discarding = false;
        let rest = mem::take(&mut self.buffer);
        (!rest.is_empty()).then_some(rest)
    }

    fn drop_line(&mut self, seen: usize) {
        warn!(
            bytes = seen,
            limit = self.max_line,
            "dropping oversized stream line"
        );
        self.buffer.clear();
    }
}

/// Decode one line into a payload message.
///
/// Returns `None` for blank lines, lines that are not a JSON object of the
/// message shape, and records whose event is not `message`.
pub fn decode_line(line: &[u8]) -> Option<Message> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_slice::<Message>(line) {
        Ok(message) if message.is_payload() => Some(message),
        Ok(message) => {
            trace!(event = ?message.event, "skipping non-payload record");
            None
        }
        Err(err) => {
            trace!(error = %err, "skipping undecodable line");
            None
        }
    }
}

struct StreamState<S> {
    bytes: Pin<Box<S>>,
    lines: LineBuffer,
    pending: VecDeque<Message>,
    ended: bool,
}

/// Turn a raw byte stream into a lazy stream of payload messages.
///
/// A read error is yielded once and terminates the stream.
pub fn message_stream<S, E>(bytes: S) -> MessageStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<NtfyError> + Send + 'static,
{
    let state = StreamState {
        bytes: Box::pin(bytes),
        lines: LineBuffer::new(),
        pending: VecDeque::new(),
        ended: false,
    };

    let stream = unfold(state, |mut state| async move {
        loop {
            if let Some(message) = state.pending.pop_front() {
                return Some((Ok(message), state));
            }
            if state.ended {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let decoded = state.lines.feed(&chunk);
                    state
                        .pending
                        .extend(decoded.iter().filter_map(|line| decode_line(line)));
                }
                Some(Err(err)) => {
                    state.ended = true;
                    return Some((Err(err.into()), state));
                }
                None => {
                    state.ended = true;
                    if let Some(rest) = state.lines.finish() {
                        state.pending.extend(decode_line(&rest));
                    }
                }
            }
        }
    });

    Box::pin(stream)
}
