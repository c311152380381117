// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared test fixtures: deterministic fake providers and pipeline setup.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use docqa_node::llm::{ChatProvider, EmbeddingProvider, ProviderError};
use docqa_node::rag::{PipelineConfig, QaPipeline};

pub const EMBED_DIM: usize = 64;

/// Deterministic bag-of-words embedding: each token is FNV-hashed into a
/// bucket, so texts sharing words land near each other under cosine
/// similarity. Counts how many texts it has embedded.
#[derive(Default)]
pub struct HashEmbedding {
    pub embedded_texts: AtomicUsize,
}

pub fn hash_embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBED_DIM];
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in token.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        vector[(hash % EMBED_DIM as u64) as usize] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for HashEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.embedded_texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| hash_embed(t)).collect())
    }
}

/// Chat fake returning a canned completion; counts invocations.
pub struct CannedChat {
    pub calls: AtomicUsize,
    pub reply: String,
}

impl CannedChat {
    pub fn new(reply: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl ChatProvider for CannedChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct TestPipeline {
    pub pipeline: Arc<QaPipeline>,
    pub embeddings: Arc<HashEmbedding>,
    pub chat: Arc<CannedChat>,
}

pub fn build_pipeline(document_path: &Path, index_path: &Path, top_k: usize) -> TestPipeline {
    let embeddings = Arc::new(HashEmbedding::default());
    let chat = Arc::new(CannedChat::new("Based on the context, the answer is yes."));

    let config = PipelineConfig {
        document_path: document_path.to_path_buf(),
        index_path: index_path.to_path_buf(),
        chunk_size: 200,
        chunk_overlap: 50,
        top_k,
    };

    let pipeline = Arc::new(QaPipeline::new(
        config,
        embeddings.clone(),
        chat.clone(),
    ));

    TestPipeline {
        pipeline,
        embeddings,
        chat,
    }
}
