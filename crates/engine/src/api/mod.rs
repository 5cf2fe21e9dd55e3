//! Outbound clients for the language-model completion API

pub mod openai;

pub use openai::{OpenAiClient, OpenAiConfig};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Completion API returned no text")]
    EmptyResponse,
}

/// A single, non-streamed text completion. Implementations make exactly one
/// attempt; retrying is left to the caller.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
