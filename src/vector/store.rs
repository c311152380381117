// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! On-disk persistence for embedding records.
//!
//! Records are written once at cold-start index build and read back on warm
//! starts; nothing ever updates the file in place. The ANN structure itself
//! is rebuilt from the records on load.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::index::EmbeddingRecord;

const RECORDS_FILE: &str = "records.bin";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("index store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index store codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Handle to the persisted record file under the configured index directory.
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn records_path(&self) -> PathBuf {
        self.dir.join(RECORDS_FILE)
    }

    /// True when a previous build persisted records here (warm start).
    pub fn exists(&self) -> bool {
        self.records_path().is_file()
    }

    pub fn load(&self) -> Result<Vec<EmbeddingRecord>, StoreError> {
        let bytes = fs::read(self.records_path())?;
        let records: Vec<EmbeddingRecord> = bincode::deserialize(&bytes)?;
        info!(
            "Loaded {} embedding records from {}",
            records.len(),
            self.records_path().display()
        );
        Ok(records)
    }

    pub fn persist(&self, records: &[EmbeddingRecord]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = bincode::serialize(records)?;
        fs::write(self.records_path(), bytes)?;
        info!(
            "Persisted {} embedding records to {}",
            records.len(),
            self.records_path().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::index::RecordMetadata;

    fn sample_records() -> Vec<EmbeddingRecord> {
        vec![EmbeddingRecord {
            id: "chunk-0".to_string(),
            text: "some chunk text".to_string(),
            vector: vec![0.1, 0.2, 0.3],
            metadata: RecordMetadata {
                source: "a.txt".to_string(),
                doc_type: "txt".to_string(),
            },
        }]
    }

    #[test]
    fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        assert!(!store.exists());

        store.persist(&sample_records()).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "some chunk text");
        assert_eq!(loaded[0].metadata.source, "a.txt");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("db").join("vector_index");
        let store = IndexStore::new(&nested);
        store.persist(&sample_records()).unwrap();
        assert!(store.exists());
    }
}
