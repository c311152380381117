// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use docqa_node::{
    api::{start_server, AppState},
    config::Settings,
    db::{InteractionLog, TokenStore},
    llm::OpenAiClient,
    rag::{PipelineConfig, QaPipeline},
};
use std::{env, net::SocketAddr, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();

    info!("🚀 Starting corpus QA node...");
    info!("Using provider base URL: {}", settings.openai_base_url);
    info!("Document directory: {}", settings.document_path.display());
    info!("Index directory: {}", settings.index_path.display());

    let client = Arc::new(OpenAiClient::new(
        &settings.openai_base_url,
        &settings.openai_api_key,
        &settings.model_name,
        &settings.embedding_model,
        settings.temperature,
    )?);

    let pipeline = Arc::new(QaPipeline::new(
        PipelineConfig::from_settings(&settings),
        client.clone(),
        client,
    ));

    // Build or load the vector index before accepting traffic
    info!("Initializing QA system...");
    pipeline
        .initialize()
        .await
        .context("QA system initialization failed")?;

    let state = AppState {
        pipeline,
        tokens: Arc::new(TokenStore::new(&settings.db_dir)),
        interactions: Arc::new(InteractionLog::new(&settings.db_dir)),
        settings: Arc::new(settings.clone()),
    };

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", settings.host, settings.port))?;

    start_server(state, addr).await
}
