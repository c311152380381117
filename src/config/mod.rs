// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration loaded from the environment.
//!
//! All settings are plain key-value pairs with defaults; values that fail to
//! parse fall back to the default rather than aborting startup.

use std::env;
use std::path::PathBuf;

/// Process-wide settings for the question-answering node.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the OpenAI-compatible provider (embeddings + chat)
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub openai_base_url: String,
    /// Chat model used for answer synthesis
    pub model_name: String,
    /// Embedding model used for indexing and query embedding
    pub embedding_model: String,
    /// Sampling temperature for answer synthesis
    pub temperature: f32,

    /// Directory holding the source documents
    pub document_path: PathBuf,
    /// Directory where the persisted vector index lives
    pub index_path: PathBuf,
    /// Directory for the flat-file token / interaction stores
    pub db_dir: PathBuf,

    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question
    pub retrieval_top_k: usize,

    /// Listen host and port for the HTTP server
    pub host: String,
    pub port: u16,
    /// Base URL used when rendering customer access links
    pub public_base_url: String,

    /// Admin panel credentials (HTTP Basic)
    pub admin_username: String,
    pub admin_password: String,
}

impl Settings {
    /// Read settings from the environment, applying defaults for anything
    /// unset or unparseable.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model_name: env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
            temperature: parse_or("TEMPERATURE", 0.7),
            document_path: PathBuf::from(
                env::var("DOCUMENT_PATH").unwrap_or_else(|_| "data".to_string()),
            ),
            index_path: PathBuf::from(
                env::var("INDEX_PATH").unwrap_or_else(|_| "db/vector_index".to_string()),
            ),
            db_dir: PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "db".to_string())),
            chunk_size: parse_or("CHUNK_SIZE", 200),
            chunk_overlap: parse_or("CHUNK_OVERLAP", 50),
            retrieval_top_k: parse_or("RETRIEVAL_TOP_K", 3),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8000),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
