// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request/response types and handlers for the public and admin endpoints.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::{Interaction, InteractionStats, TokenRecord};
use crate::rag::PipelineError;

use super::admin::verify_admin;
use super::errors::ApiError;
use super::http_server::AppState;

const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCreateResponse {
    pub token: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    pub customer_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserHistoryResponse {
    pub token: String,
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub description: String,
    pub size: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentInfo>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTokenForm {
    pub customer_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RevokeTokenForm {
    pub token: String,
}

/// Resolve the customer token from the query string or the auth cookie.
fn request_token(params: &TokenQuery, jar: &CookieJar) -> String {
    params
        .token
        .clone()
        .or_else(|| jar.get(AUTH_COOKIE).map(|c| c.value().to_string()))
        .unwrap_or_default()
}

async fn require_customer_token(
    state: &AppState,
    params: &TokenQuery,
    jar: &CookieJar,
) -> Result<String, ApiError> {
    let token = request_token(params, jar);
    if token.is_empty() || !state.tokens.validate(&token).await {
        return Err(ApiError::Unauthorized(
            "Invalid or missing access token".to_string(),
        ));
    }
    Ok(token)
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Ask a question about the corpus. Token-gated; records the interaction.
pub async fn ask_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TokenQuery>,
    Json(request): Json<QuestionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_customer_token(&state, &params, &jar).await?;

    if request.question.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "Question cannot be empty".to_string(),
        ));
    }

    let answer = match state.pipeline.answer(&request.question).await {
        Ok(answer) => answer,
        Err(PipelineError::EmptyQuestion) => {
            return Err(ApiError::InvalidRequest(
                "Question cannot be empty".to_string(),
            ))
        }
        Err(e) => {
            error!("Error processing question: {}", e);
            return Err(ApiError::InternalError(format!(
                "Error processing your question: {}",
                e
            )));
        }
    };

    if let Err(e) = state
        .interactions
        .record(&token, &request.question, &answer)
        .await
    {
        error!("Failed to record interaction: {}", e);
    }

    // Remember the token so subsequent requests can omit the query param
    let jar = if jar.get(AUTH_COOKIE).is_none() {
        jar.add(Cookie::build((AUTH_COOKIE, token)).http_only(true).build())
    } else {
        jar
    };

    Ok((jar, Json(AnswerResponse { answer })))
}

/// List the corpus directory with display metadata. Token-gated.
pub async fn documents_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TokenQuery>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    require_customer_token(&state, &params, &jar).await?;

    let dir = &state.settings.document_path;
    if !dir.is_dir() {
        return Ok(Json(DocumentsResponse {
            documents: Vec::new(),
        }));
    }

    let mut documents = Vec::new();
    let entries = fs::read_dir(dir)
        .map_err(|e| ApiError::InternalError(format!("Error listing documents: {}", e)))?;
    for entry in entries.flatten() {
        let path = entry.path();
        let filename = entry.file_name().to_string_lossy().to_string();
        if path.is_dir() || filename.starts_with('.') {
            continue;
        }
        let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        documents.push(document_info(&path, &filename, size_bytes));
    }
    documents.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(Json(DocumentsResponse { documents }))
}

// --- token management (admin) ---

pub async fn create_token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateTokenForm>,
) -> Result<Json<TokenCreateResponse>, ApiError> {
    verify_admin(&headers, &state.settings)?;

    let record = state
        .tokens
        .create(&form.customer_name, &form.email)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let url = format!(
        "{}/demo?token={}",
        state.settings.public_base_url, record.token
    );
    Ok(Json(TokenCreateResponse {
        token: record.token,
        url,
    }))
}

pub async fn revoke_token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RevokeTokenForm>,
) -> Result<Json<StatusMessage>, ApiError> {
    verify_admin(&headers, &state.settings)?;

    let revoked = state
        .tokens
        .revoke(&form.token)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    if !revoked {
        return Err(ApiError::NotFound("Token not found".to_string()));
    }

    Ok(Json(StatusMessage {
        status: "success".to_string(),
        message: "Token revoked successfully".to_string(),
    }))
}

pub async fn list_tokens_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TokenRecord>>, ApiError> {
    verify_admin(&headers, &state.settings)?;
    Ok(Json(state.tokens.list().await))
}

pub async fn validate_token_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ValidateResponse> {
    let valid = match params.get("token") {
        Some(token) => state.tokens.validate(token).await,
        None => false,
    };
    Json(ValidateResponse { valid })
}

/// Customer display info for a token. Unknown tokens return empty fields
/// rather than an error, matching the demo page contract.
pub async fn token_info_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<TokenInfoResponse> {
    let record = match params.get("token") {
        Some(token) => state.tokens.find(token).await,
        None => None,
    };

    match record {
        Some(record) => Json(TokenInfoResponse {
            customer_name: record.customer_name,
            email: record.email,
        }),
        None => Json(TokenInfoResponse {
            customer_name: String::new(),
            email: String::new(),
        }),
    }
}

// --- interaction statistics ---

pub async fn interaction_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InteractionStats>, ApiError> {
    verify_admin(&headers, &state.settings)?;
    Ok(Json(state.interactions.stats().await))
}

pub async fn user_history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(token): UrlPath<String>,
) -> Result<Json<UserHistoryResponse>, ApiError> {
    verify_admin(&headers, &state.settings)?;
    let interactions = state.interactions.for_token(&token).await;
    Ok(Json(UserHistoryResponse {
        token,
        interactions,
    }))
}

pub async fn interaction_count_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<CountResponse> {
    let count = match params.get("token").filter(|t| !t.is_empty()) {
        Some(token) => state.interactions.for_token(token).await.len(),
        None => 0,
    };
    Json(CountResponse { count })
}

// --- document listing helpers ---

fn document_info(path: &Path, filename: &str, size_bytes: u64) -> DocumentInfo {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = title_case(&stem.replace('_', " "));

    DocumentInfo {
        id: stem.to_lowercase().replace([' ', '_'], "-"),
        description: format!("{} document for reference.", title),
        title,
        filename: filename.to_string(),
        size: format_size(size_bytes),
        file_type: coarse_type(path),
    }
}

fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{:.0} KB", kb)
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}

fn coarse_type(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "pdf",
        "xls" | "xlsx" | "csv" => "excel",
        "doc" | "docx" => "word",
        "txt" | "md" | "tex" => "text",
        _ => "unknown",
    }
    .to_string()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(300 * 1024), "300 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    #[test]
    fn test_coarse_type() {
        assert_eq!(coarse_type(Path::new("a.pdf")), "pdf");
        assert_eq!(coarse_type(Path::new("a.xlsx")), "excel");
        assert_eq!(coarse_type(Path::new("a.docx")), "word");
        assert_eq!(coarse_type(Path::new("a.md")), "text");
        assert_eq!(coarse_type(Path::new("a.bin")), "unknown");
    }

    #[test]
    fn test_document_info_display_fields() {
        let info = document_info(
            Path::new("data/insurance_regulations.txt"),
            "insurance_regulations.txt",
            2048,
        );
        assert_eq!(info.id, "insurance-regulations");
        assert_eq!(info.title, "Insurance Regulations");
        assert_eq!(info.size, "2 KB");
        assert_eq!(info.file_type, "text");
    }
}
