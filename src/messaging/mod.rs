//! Outbound message dispatch
//!
//! Long texts are word-wrapped into chunks that fit one channel message and
//! sent in order through a [`MessageTransport`]. Every chunk is attempted even
//! after a failure; the first failure is the one reported.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{Result, TripPlannerError};

pub mod twilio;

pub use twilio::TwilioWhatsAppClient;

/// WhatsApp body limit enforced by Twilio
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1500;

/// Sends one message body from the configured sender to the configured recipient
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, body: &str) -> Result<()>;
}

/// Outcome of dispatching a whole message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchStatus {
    /// Every chunk was accepted
    Sent { chunks: usize },
    /// At least one chunk failed; `error` describes the first failure
    Failed {
        error: String,
        delivered: usize,
        attempted: usize,
    },
}

impl DispatchStatus {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchStatus::Sent { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            DispatchStatus::Sent { .. } => None,
            DispatchStatus::Failed { error, .. } => Some(error),
        }
    }
}

/// Splits messages into chunks and sends them through a transport
#[derive(Clone)]
pub struct MessageDispatcher {
    transport: Arc<dyn MessageTransport>,
    max_chunk_chars: usize,
}

impl MessageDispatcher {
    pub fn new(transport: Arc<dyn MessageTransport>, max_chunk_chars: usize) -> Self {
        Self {
            transport,
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    /// Send `message` as consecutive chunks. Never fails; failures are
    /// reported in the returned status and already-sent chunks stay sent.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn send(&self, message: &str) -> DispatchStatus {
        let chunks = split_into_chunks(message, self.max_chunk_chars);
        let attempted = chunks.len();
        let mut delivered = 0;
        let mut first_error: Option<String> = None;

        for (index, chunk) in chunks.iter().enumerate() {
            debug!(
                "Sending chunk {}/{} ({} chars)",
                index + 1,
                attempted,
                chunk.chars().count()
            );
            match self.transport.send(chunk).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Chunk {}/{} failed: {}", index + 1, attempted, e);
                    first_error.get_or_insert_with(|| describe(&e));
                }
            }
        }

        match first_error {
            None => {
                info!("Message delivered in {} chunks", delivered);
                DispatchStatus::Sent { chunks: delivered }
            }
            Some(error) => {
                warn!("Delivered {} of {} chunks", delivered, attempted);
                DispatchStatus::Failed {
                    error,
                    delivered,
                    attempted,
                }
            }
        }
    }
}

fn describe(err: &TripPlannerError) -> String {
    match err {
        TripPlannerError::Messaging { message } => message.clone(),
        other => other.to_string(),
    }
}

/// Word-wrap `text` into chunks of at most `max_chars` characters.
///
/// Breaks at the last whitespace that fits and drops the whitespace run at the
/// break. A word longer than `max_chars` is split mid-word. Whitespace inside a
/// chunk, including newlines, is kept.
#[must_use]
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        // Byte offset just past the first `max_chars` characters
        let Some((limit, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(rest.to_string());
            break;
        };

        let window = &rest[..limit];
        let break_at = if rest[limit..].starts_with(char::is_whitespace) {
            Some(limit)
        } else {
            window
                .rfind(char::is_whitespace)
                .filter(|&i| !window[..i].trim_end().is_empty())
        };

        match break_at {
            Some(i) => {
                chunks.push(window[..i].trim_end().to_string());
                rest = rest[i..].trim_start();
            }
            None => {
                chunks.push(window.to_string());
                rest = &rest[limit..];
            }
        }
    }

    chunks
}
