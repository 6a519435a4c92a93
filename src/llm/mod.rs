//! Language model access
//!
//! The itinerary composer only needs single-turn text completion, expressed by
//! [`CompletionModel`]. [`ChatCompletionsClient`] implements it against any
//! OpenAI-compatible `chat/completions` endpoint; the default configuration
//! points it at Perplexity.

use async_trait::async_trait;

use crate::Result;

pub mod chat;

pub use chat::ChatCompletionsClient;

/// Single-turn text completion
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Send `prompt` as one user message and return the full response text
    async fn complete(&self, prompt: &str) -> Result<String>;
}
