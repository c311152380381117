// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question-answering pipeline: initialize-once, query-many.
//!
//! The pipeline owns the vector index and the provider handles. It starts
//! `Uninitialized` and becomes `Ready` exactly once, either through an
//! explicit [`QaPipeline::initialize`] call at startup or lazily on the first
//! question. The transition is guarded by a single-entry async lock so
//! concurrent first questions cannot build (or persist) the index twice.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::config::Settings;
use crate::ingest::{self, LoadError};
use crate::llm::{ChatProvider, EmbeddingProvider, ProviderError};
use crate::vector::{EmbeddingRecord, IndexStore, SearchHit, StoreError, VectorIndex};

use super::chunker::chunk_document;

/// Number of chunk texts sent per embedding request.
const EMBED_BATCH_SIZE: usize = 64;

const SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the question at the \
     end. If you don't know the answer based on the context, just say that you don't know, don't \
     try to make up an answer.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("failed to load documents: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("index store error: {0}")]
    Store(#[from] StoreError),

    #[error("vector index error: {0}")]
    Index(String),
}

/// Pipeline-relevant slice of the runtime settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub document_path: PathBuf,
    pub index_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            document_path: settings.document_path.clone(),
            index_path: settings.index_path.clone(),
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            top_k: settings.retrieval_top_k,
        }
    }
}

pub struct QaPipeline {
    config: PipelineConfig,
    embeddings: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatProvider>,
    /// `Some` once the pipeline is Ready; never goes back to `None`
    index: RwLock<Option<Arc<VectorIndex>>>,
    /// Single-entry gate for the Uninitialized -> Ready transition
    init_lock: Mutex<()>,
}

impl QaPipeline {
    pub fn new(
        config: PipelineConfig,
        embeddings: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            config,
            embeddings,
            chat,
            index: RwLock::new(None),
            init_lock: Mutex::new(()),
        }
    }

    /// Transition to Ready. Safe to call more than once and from concurrent
    /// tasks: the index is built (and persisted) at most once per process.
    pub async fn initialize(&self) -> Result<(), PipelineError> {
        self.ensure_ready().await.map(|_| ())
    }

    /// True once the pipeline has an index and can answer questions.
    pub async fn is_ready(&self) -> bool {
        self.index.read().await.is_some()
    }

    /// Answer a question against the indexed corpus.
    ///
    /// Rejects empty questions before doing any work; initializes lazily if
    /// [`QaPipeline::initialize`] was never called.
    pub async fn answer(&self, question: &str) -> Result<String, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }

        let index = self.ensure_ready().await?;
        info!("Received question: {}", question);

        let query_vector = self.embeddings.embed(question).await?;
        let hits = index
            .search(&query_vector, self.config.top_k)
            .map_err(|e| PipelineError::Index(e.to_string()))?;

        self.synthesize(question, &hits).await
    }

    async fn ensure_ready(&self) -> Result<Arc<VectorIndex>, PipelineError> {
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(index.clone());
        }

        let _guard = self.init_lock.lock().await;
        // Another task may have finished initialization while we waited
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(index.clone());
        }

        let records = self.build_or_load_records().await?;
        let index = Arc::new(
            VectorIndex::build(records).map_err(|e| PipelineError::Index(e.to_string()))?,
        );
        *self.index.write().await = Some(index.clone());
        info!("RAG system initialized successfully ({} records)", index.len());
        Ok(index)
    }

    /// Warm start: load persisted records and skip embedding entirely.
    /// Cold start: scan, chunk, embed, persist.
    async fn build_or_load_records(&self) -> Result<Vec<EmbeddingRecord>, PipelineError> {
        let store = IndexStore::new(&self.config.index_path);
        if store.exists() {
            info!(
                "Found persisted index at {}, skipping re-embedding",
                self.config.index_path.display()
            );
            return Ok(store.load()?);
        }

        info!(
            "Building vector index from documents in {}",
            self.config.document_path.display()
        );
        let outcomes = ingest::load_directory(&self.config.document_path)?;
        let mut documents = ingest::loader::documents(outcomes);
        if documents.is_empty() {
            warn!("No documents could be processed, indexing placeholder document");
            documents.push(ingest::placeholder_document());
        }

        let mut chunks = Vec::new();
        for doc in &documents {
            let doc_chunks =
                chunk_document(doc, self.config.chunk_size, self.config.chunk_overlap);
            info!("Created {} chunks from {}", doc_chunks.len(), doc.filename);
            chunks.extend(doc_chunks);
        }
        info!("Total chunks created: {}", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            vectors.extend(self.embeddings.embed_batch(batch).await?);
        }

        let records: Vec<EmbeddingRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddingRecord {
                id: uuid::Uuid::new_v4().to_string(),
                text: chunk.text,
                vector,
                metadata: chunk.metadata,
            })
            .collect();

        store.persist(&records)?;
        Ok(records)
    }

    /// Stuff all retrieved chunks plus the question into a single completion
    /// call, then append the deduplicated source list.
    async fn synthesize(
        &self,
        question: &str,
        hits: &[SearchHit],
    ) -> Result<String, PipelineError> {
        let context = hits
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let user = format!("Context:\n{}\n\nQuestion: {}", context, question);

        let mut answer = self.chat.complete(SYSTEM_PROMPT, &user).await?;

        let sources: BTreeSet<&str> = hits.iter().map(|h| h.metadata.source.as_str()).collect();
        if !sources.is_empty() {
            let source_list = sources.into_iter().collect::<Vec<_>>().join(", ");
            info!("Answer sources: {}", source_list);
            answer.push_str(&format!("\n\nSources: {}", source_list));
        }

        Ok(answer)
    }
}
