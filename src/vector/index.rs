// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory HNSW index over embedding records.
//!
//! Hierarchical Navigable Small World graph with cosine distance; vectors are
//! normalized on insert so distances map directly to cosine similarity. The
//! index is built once from the full record set and is read-only afterwards:
//! there is no insert/delete path on a live index.

use anyhow::{anyhow, Result};
use hnsw_rs::hnsw::{Hnsw, Neighbour};
use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};

/// Source attribution carried by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Filename of the originating document
    pub source: String,
    /// Document type tag (file extension)
    pub doc_type: String,
}

/// One embedded chunk: the text, its vector, and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub metadata: RecordMetadata,
}

/// Search result with similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Cosine similarity, higher is closer
    pub score: f32,
    pub text: String,
    pub metadata: RecordMetadata,
}

pub struct VectorIndex {
    hnsw: Hnsw<'static, f32, DistCosine>,
    records: Vec<EmbeddingRecord>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index from the full record set.
    ///
    /// All vectors must share the same dimension and contain only finite
    /// values. An empty record set builds an empty index whose searches
    /// return nothing.
    pub fn build(records: Vec<EmbeddingRecord>) -> Result<Self> {
        let dimensions = records.first().map(|r| r.vector.len()).unwrap_or(0);

        for (i, record) in records.iter().enumerate() {
            if record.vector.len() != dimensions {
                return Err(anyhow!(
                    "record {} has wrong dimensions: expected {}, got {}",
                    i,
                    dimensions,
                    record.vector.len()
                ));
            }
            if record.vector.iter().any(|&v| !v.is_finite()) {
                return Err(anyhow!("record {} contains NaN or Infinity values", i));
            }
        }

        // HNSW parameters: M=16 connections per layer, ef_construction=200
        let mut hnsw: Hnsw<f32, DistCosine> =
            Hnsw::new(16, records.len().max(1), 16, 200, DistCosine);

        for (hnsw_id, record) in records.iter().enumerate() {
            let normalized = normalize_vector(&record.vector);
            hnsw.insert((&normalized, hnsw_id));
        }
        hnsw.set_searching_mode(true);

        Ok(Self {
            hnsw,
            records,
            dimensions,
        })
    }

    /// Return the `k` records nearest to `query` by cosine similarity,
    /// highest first. An index with fewer than `k` entries returns all of
    /// them.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(anyhow!(
                "query has wrong dimensions: expected {}, got {}",
                self.dimensions,
                query.len()
            ));
        }
        if query.iter().any(|&v| !v.is_finite()) {
            return Err(anyhow!("query contains NaN or Infinity values"));
        }

        let normalized_query = normalize_vector(query);
        let ef_search = (k * 2).max(50);
        let neighbours: Vec<Neighbour> = self.hnsw.search(&normalized_query, k, ef_search);

        let mut hits: Vec<SearchHit> = neighbours
            .into_iter()
            .filter_map(|n| {
                self.records.get(n.d_id).map(|record| SearchHit {
                    // cosine distance -> similarity
                    score: 1.0 - n.distance,
                    text: record.text.clone(),
                    metadata: record.metadata.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }
}

/// Normalize to unit length so cosine similarity is computed correctly.
fn normalize_vector(vector: &[f32]) -> Vec<f32> {
    let magnitude: f32 = vector.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return vector.to_vec();
    }
    vector.iter().map(|&x| x / magnitude).collect()
}
