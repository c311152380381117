// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Customer access token storage.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::DbError;

const TOKENS_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Active,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub customer_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub status: TokenStatus,
}

/// JSON-file-backed token store. All mutations rewrite the file whole.
pub struct TokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TokenStore {
    pub fn new(db_dir: &Path) -> Self {
        Self {
            path: db_dir.join(TOKENS_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Issue a new active token for a customer.
    pub async fn create(&self, customer_name: &str, email: &str) -> Result<TokenRecord, DbError> {
        let _guard = self.lock.lock().await;

        let record = TokenRecord {
            token: Uuid::new_v4().to_string(),
            customer_name: customer_name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
            status: TokenStatus::Active,
        };

        let mut tokens = self.read_all();
        tokens.push(record.clone());
        self.write_all(&tokens)?;

        info!("Issued token for customer {}", customer_name);
        Ok(record)
    }

    /// True iff the token exists and is active.
    pub async fn validate(&self, token: &str) -> bool {
        let _guard = self.lock.lock().await;
        self.read_all()
            .iter()
            .any(|t| t.token == token && t.status == TokenStatus::Active)
    }

    /// Mark a token revoked. Returns false when the token is unknown.
    pub async fn revoke(&self, token: &str) -> Result<bool, DbError> {
        let _guard = self.lock.lock().await;

        let mut tokens = self.read_all();
        let found = match tokens.iter_mut().find(|t| t.token == token) {
            Some(record) => {
                record.status = TokenStatus::Revoked;
                true
            }
            None => false,
        };

        if found {
            self.write_all(&tokens)?;
            info!(
                "Revoked token {}...",
                token.chars().take(8).collect::<String>()
            );
        }
        Ok(found)
    }

    pub async fn list(&self) -> Vec<TokenRecord> {
        let _guard = self.lock.lock().await;
        self.read_all()
    }

    pub async fn find(&self, token: &str) -> Option<TokenRecord> {
        let _guard = self.lock.lock().await;
        self.read_all().into_iter().find(|t| t.token == token)
    }

    fn read_all(&self) -> Vec<TokenRecord> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Token store at {} is corrupt ({}), treating as empty", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn write_all(&self, tokens: &[TokenRecord]) -> Result<(), DbError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(tokens)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());

        let record = store.create("Acme Corp", "ops@acme.example").await.unwrap();
        assert_eq!(record.status, TokenStatus::Active);
        assert!(store.validate(&record.token).await);
        assert!(!store.validate("no-such-token").await);
    }

    #[tokio::test]
    async fn test_revoke() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path());

        let record = store.create("Acme Corp", "ops@acme.example").await.unwrap();
        assert!(store.revoke(&record.token).await.unwrap());
        assert!(!store.validate(&record.token).await);
        assert!(!store.revoke("no-such-token").await.unwrap());

        // Revoked tokens stay listed
        let all = store.list().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, TokenStatus::Revoked);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKENS_FILE), b"{not json").unwrap();

        let store = TokenStore::new(dir.path());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let token = {
            let store = TokenStore::new(dir.path());
            store.create("A", "a@example.com").await.unwrap().token
        };
        let store = TokenStore::new(dir.path());
        assert!(store.validate(&token).await);
    }
}
