// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::db::{InteractionLog, TokenStore};
use crate::rag::QaPipeline;

use super::handlers::{
    ask_handler, create_token_handler, documents_handler, health_handler,
    interaction_count_handler, interaction_stats_handler, list_tokens_handler,
    revoke_token_handler, token_info_handler, user_history_handler, validate_token_handler,
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QaPipeline>,
    pub tokens: Arc<TokenStore>,
    pub interactions: Arc<InteractionLog>,
    pub settings: Arc<Settings>,
}

/// Build the application router. Separated from [`start_server`] so tests can
/// drive the app in-process with `tower::ServiceExt::oneshot`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Question answering
        .route("/api/ask", post(ask_handler))
        .route("/api/health", get(health_handler))
        .route("/api/documents", get(documents_handler))
        // Token management
        .route("/api/token/create", post(create_token_handler))
        .route("/api/token/revoke", post(revoke_token_handler))
        .route("/api/token/list", get(list_tokens_handler))
        .route("/api/token/validate", get(validate_token_handler))
        .route("/api/token/info", get(token_info_handler))
        // Usage statistics
        .route("/api/interactions/stats", get(interaction_stats_handler))
        .route("/api/interactions/user/:token", get(user_history_handler))
        .route("/api/interactions/count", get(interaction_count_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
