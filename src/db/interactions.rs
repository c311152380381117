// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-token interaction history and usage statistics.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use super::DbError;

const INTERACTIONS_FILE: &str = "interactions.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    /// Truncated token, for display without exposing the credential
    pub token: String,
    pub interaction_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionStats {
    pub total_users: usize,
    pub total_interactions: usize,
    pub users: Vec<UserStats>,
}

/// JSON-file-backed map of token -> interaction list.
pub struct InteractionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl InteractionLog {
    pub fn new(db_dir: &Path) -> Self {
        Self {
            path: db_dir.join(INTERACTIONS_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Append one question/answer pair for a token. Interactions without a
    /// token are not recorded.
    pub async fn record(&self, token: &str, question: &str, answer: &str) -> Result<(), DbError> {
        if token.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;

        let mut interactions = self.read_all();
        interactions
            .entry(token.to_string())
            .or_default()
            .push(Interaction {
                timestamp: Utc::now(),
                question: question.to_string(),
                answer: answer.to_string(),
            });
        self.write_all(&interactions)
    }

    pub async fn for_token(&self, token: &str) -> Vec<Interaction> {
        let _guard = self.lock.lock().await;
        self.read_all().remove(token).unwrap_or_default()
    }

    pub async fn stats(&self) -> InteractionStats {
        let _guard = self.lock.lock().await;
        let interactions = self.read_all();

        let total_users = interactions.len();
        let total_interactions = interactions.values().map(Vec::len).sum();

        let users = interactions
            .iter()
            .map(|(token, history)| UserStats {
                token: format!("{}...", token.chars().take(8).collect::<String>()),
                interaction_count: history.len(),
                last_activity: history.iter().map(|i| i.timestamp).max(),
            })
            .collect();

        InteractionStats {
            total_users,
            total_interactions,
            users,
        }
    }

    fn read_all(&self) -> BTreeMap<String, Vec<Interaction>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    "Interaction log at {} is corrupt ({}), treating as empty",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, interactions: &BTreeMap<String, Vec<Interaction>>) -> Result<(), DbError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(interactions)?)?;
        Ok(())
    }
}
