// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flat-file JSON stores for customer tokens and interaction history.
//!
//! Durability is best-effort: every mutation rewrites the whole file under a
//! process-level lock. Missing or corrupt files read as empty.

pub mod interactions;
pub mod token_store;

use thiserror::Error;

pub use interactions::{Interaction, InteractionLog, InteractionStats, UserStats};
pub use token_store::{TokenRecord, TokenStatus, TokenStore};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
