// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model provider abstractions.
//!
//! The pipeline talks to two capabilities, both served by the same
//! OpenAI-compatible endpoint in production: text embedding and chat
//! completion. They are separate traits so tests can inject deterministic
//! fakes for either side.

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiClient;

/// Errors from the embedding / chat providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection refused, DNS, TLS)
    #[error("provider request failed: {0}")]
    Request(String),

    /// Non-success HTTP status from the provider
    #[error("provider API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Request timed out at the HTTP client
    #[error("provider request timed out")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Request(e.to_string())
        }
    }
}

/// Computes embedding vectors for texts.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::MalformedResponse("empty embedding batch".to_string()))
    }
}

/// Produces a free-text completion for a system + user message pair.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}
