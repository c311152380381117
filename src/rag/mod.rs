// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval-augmented question answering over the document corpus.

pub mod chunker;
pub mod engine;

pub use chunker::{chunk_document, split_text, Chunk};
pub use engine::{PipelineConfig, PipelineError, QaPipeline};
