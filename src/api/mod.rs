// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod admin;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{
    AnswerResponse, CountResponse, DocumentInfo, DocumentsResponse, HealthResponse,
    QuestionRequest, TokenCreateResponse, TokenInfoResponse, ValidateResponse,
};
pub use http_server::{create_app, start_server, AppState};
