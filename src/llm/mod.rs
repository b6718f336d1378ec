//! Completion client module for the task-extraction model.
//!
//! The pipeline only needs single-turn completions: one system instruction,
//! one user message, free-form text back. The trait keeps that seam narrow
//! so tests can substitute a canned implementation.

mod anthropic;
mod error;

pub use anthropic::AnthropicClient;
pub use error::{classify_http_status, LlmError, LlmErrorKind, RetryConfig};

use async_trait::async_trait;

/// Trait for single-turn completion clients.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one system-prompted user message and return the model's text.
    async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String>;
}
