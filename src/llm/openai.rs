// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible HTTP client for embeddings and chat completions.
//!
//! Works against the standard OpenAI endpoint or any compatible base URL
//! (configured via `OPENAI_BASE_URL`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatProvider, EmbeddingProvider, ProviderError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        chat_model: &str,
        embedding_model: &str,
        temperature: f32,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::from_reqwest)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            chat_model: chat_model.to_string(),
            embedding_model: embedding_model.to_string(),
            temperature,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} texts via {}", texts.len(), self.base_url);

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingsRequest {
                model: &self.embedding_model,
                input: texts,
            })
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        let response = Self::check_status(response).await?;

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(ProviderError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // The API is free to reorder; the index field is authoritative
        let mut data = body.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.chat_model,
                temperature: self.temperature,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system.to_string(),
                    },
                    ChatMessage {
                        role: "user",
                        content: user.to_string(),
                    },
                ],
            })
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;
        let response = Self::check_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".to_string()))
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_strips_trailing_slash() {
        let client =
            OpenAiClient::new("http://localhost:11434/v1/", "key", "m", "e", 0.7).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_embeddings_response_deserialization() {
        let json = r#"{
            "data": [
                {"index": 1, "embedding": [0.3, 0.4]},
                {"index": 0, "embedding": [0.1, 0.2]}
            ]
        }"#;
        let mut response: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        response.data.sort_by_key(|d| d.index);
        assert_eq!(response.data[0].embedding, vec![0.1, 0.2]);
        assert_eq!(response.data[1].embedding, vec![0.3, 0.4]);
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "The answer is 42."}}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "The answer is 42.");
    }

    #[test]
    fn test_chat_response_no_choices() {
        let json = r#"{"choices": []}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices.is_empty());
    }
}
