// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod db;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod vector;

pub use api::{create_app, start_server, AppState};
pub use config::Settings;
pub use db::{InteractionLog, TokenStore};
pub use llm::{ChatProvider, EmbeddingProvider, OpenAiClient, ProviderError};
pub use rag::{PipelineConfig, PipelineError, QaPipeline};
pub use vector::{EmbeddingRecord, IndexStore, VectorIndex};
