// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pipeline lifecycle tests: at-most-once initialization, warm starts, empty
//! question rejection, and source attribution.

mod common;

use std::fs;
use std::sync::atomic::Ordering;

use common::build_pipeline;
use docqa_node::rag::PipelineError;

fn write_two_doc_corpus(dir: &std::path::Path) {
    fs::write(
        dir.join("pets.txt"),
        "Cats and dogs are common household pets. Cats sleep most of the day.",
    )
    .unwrap();
    fs::write(
        dir.join("physics.txt"),
        "Quantum entanglement links particle states across arbitrary distance.",
    )
    .unwrap();
}

#[tokio::test]
async fn test_empty_question_rejected_before_any_work() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());
    let t = build_pipeline(docs.path(), index.path(), 3);

    for question in ["", "   ", "\n\t "] {
        let err = t.pipeline.answer(question).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyQuestion));
    }

    // Neither provider was touched - not even lazy initialization ran
    assert_eq!(t.embeddings.embedded_texts.load(Ordering::SeqCst), 0);
    assert_eq!(t.chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_initialize_twice_embeds_once() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());
    let t = build_pipeline(docs.path(), index.path(), 3);

    t.pipeline.initialize().await.unwrap();
    let after_first = t.embeddings.embedded_texts.load(Ordering::SeqCst);
    assert!(after_first > 0);

    t.pipeline.initialize().await.unwrap();
    assert_eq!(t.embeddings.embedded_texts.load(Ordering::SeqCst), after_first);
}

#[tokio::test]
async fn test_concurrent_initialize_builds_index_once() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());
    let t = build_pipeline(docs.path(), index.path(), 3);

    let (a, b) = tokio::join!(t.pipeline.initialize(), t.pipeline.initialize());
    a.unwrap();
    b.unwrap();

    // Both corpus documents fit in one chunk each
    assert_eq!(t.embeddings.embedded_texts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_warm_start_skips_embedding() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());

    let cold = build_pipeline(docs.path(), index.path(), 3);
    cold.pipeline.initialize().await.unwrap();
    assert!(index.path().join("records.bin").is_file());

    // A fresh pipeline against the same index location loads instead of
    // embedding, even though the documents are still there
    let warm = build_pipeline(docs.path(), index.path(), 3);
    warm.pipeline.initialize().await.unwrap();
    assert_eq!(warm.embeddings.embedded_texts.load(Ordering::SeqCst), 0);

    // And it can still answer questions
    let answer = warm.pipeline.answer("Tell me about pets").await.unwrap();
    assert!(answer.contains("Sources:"));
}

#[tokio::test]
async fn test_lazy_initialization_on_first_question() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());
    let t = build_pipeline(docs.path(), index.path(), 3);

    let answer = t.pipeline.answer("What do cats do?").await.unwrap();
    assert!(answer.starts_with("Based on the context"));
    assert!(t.embeddings.embedded_texts.load(Ordering::SeqCst) > 0);
    assert_eq!(t.chat.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_source_attribution_points_at_matching_document() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());
    // top_k = 1 so only the closest chunk is retrieved
    let t = build_pipeline(docs.path(), index.path(), 1);

    let answer = t
        .pipeline
        .answer("quantum entanglement particle states")
        .await
        .unwrap();
    assert!(answer.contains("physics.txt"), "answer: {}", answer);
    assert!(!answer.contains("pets.txt"), "answer: {}", answer);
}

#[tokio::test]
async fn test_retrieval_with_fewer_entries_than_k() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    write_two_doc_corpus(docs.path());
    // K is larger than the whole index; both documents come back as sources
    let t = build_pipeline(docs.path(), index.path(), 10);

    let answer = t.pipeline.answer("anything at all").await.unwrap();
    assert!(answer.contains("pets.txt"));
    assert!(answer.contains("physics.txt"));
}

#[tokio::test]
async fn test_empty_corpus_uses_placeholder() {
    let docs = tempfile::tempdir().unwrap();
    let index = tempfile::tempdir().unwrap();
    // only an unsupported file in the corpus
    fs::write(docs.path().join("image.png"), [0u8; 8]).unwrap();
    let t = build_pipeline(docs.path(), index.path(), 3);

    t.pipeline.initialize().await.unwrap();
    let answer = t.pipeline.answer("is anything here?").await.unwrap();
    assert!(answer.contains("default.txt"));
}

#[tokio::test]
async fn test_missing_document_directory_fails_initialization() {
    let index = tempfile::tempdir().unwrap();
    let t = build_pipeline(
        std::path::Path::new("/definitely/not/a/real/dir"),
        index.path(),
        3,
    );

    assert!(matches!(
        t.pipeline.initialize().await,
        Err(PipelineError::Load(_))
    ));
}
