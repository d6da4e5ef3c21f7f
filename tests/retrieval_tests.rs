//! Retrieval behaviour over a knowledge base built with a deterministic embedder.

mod common;

use common::mocks::{FailingEmbedder, HashEmbedder};
use folio::rag::chunk_document;
use folio::rag::retriever::retrieve;
use folio::{AppError, Chunk, KnowledgeBase, TextChunker};
use folio_vector::DistanceMetric;
use rstest::rstest;

const DOC: &str = "Rust guarantees memory safety without a garbage collector. \
    The borrow checker enforces ownership rules at compile time. \
    Tokio is an asynchronous runtime for writing network applications. \
    Serde serializes and deserializes Rust data structures efficiently. \
    Tracing provides structured diagnostics for async programs. \
    Clap parses command line arguments with a derive macro.";

fn build(embedder: &mut HashEmbedder) -> KnowledgeBase {
    let chunker = TextChunker::new(8, 2).unwrap();
    let chunks = chunk_document(&chunker, DOC);
    KnowledgeBase::build(chunks, embedder, DistanceMetric::Euclidean).unwrap()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn test_returns_exactly_k_sorted(#[case] k: usize) {
    let mut embedder = HashEmbedder::new(32);
    let kb = build(&mut embedder);
    assert!(kb.len() > 3);

    let results = retrieve("async runtime for network code", &mut embedder, &kb, k).unwrap();

    assert_eq!(results.len(), k);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.rank, i + 1);
        assert_eq!(kb.chunk(result.position).unwrap().text, result.text);
    }
    assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn test_k_larger_than_corpus_is_clamped_and_deterministic() {
    let mut embedder = HashEmbedder::new(32);
    let kb = build(&mut embedder);

    let first = retrieve("ownership", &mut embedder, &kb, kb.len() + 10).unwrap();
    let second = retrieve("ownership", &mut embedder, &kb, kb.len() + 10).unwrap();

    assert_eq!(first.len(), kb.len());
    assert_eq!(first, second);

    let mut positions: Vec<usize> = first.iter().map(|r| r.position).collect();
    positions.sort_unstable();
    assert_eq!(positions, (0..kb.len()).collect::<Vec<_>>());
}

#[test]
fn test_repeated_builds_give_identical_results() {
    let query = "structured diagnostics";
    let mut a = HashEmbedder::new(16);
    let mut b = HashEmbedder::new(16);
    let kb_a = build(&mut a);
    let kb_b = build(&mut b);

    assert_eq!(
        retrieve(query, &mut a, &kb_a, 3).unwrap(),
        retrieve(query, &mut b, &kb_b, 3).unwrap()
    );
}

#[test]
fn test_query_equal_to_a_chunk_ranks_it_first() {
    let mut embedder = HashEmbedder::new(64);
    let kb = build(&mut embedder);

    for target in kb.chunks().cloned().collect::<Vec<Chunk>>() {
        for k in 1..=kb.len() {
            let results = retrieve(&target.text, &mut embedder, &kb, k).unwrap();
            assert_eq!(results[0].distance, 0.0);
            assert_eq!(
                embedder.vector(&results[0].text),
                embedder.vector(&target.text)
            );
        }
    }
}

#[test]
fn test_shared_words_outrank_a_short_unrelated_chunk() {
    let mut embedder = HashEmbedder::new(32);
    let chunks = vec![
        Chunk {
            position: 0,
            text: "--- Page 1 --- ferris the crab is the unofficial".to_string(),
        },
        Chunk {
            position: 1,
            text: "chance of rain later".to_string(),
        },
    ];
    let kb = KnowledgeBase::build(chunks, &mut embedder, DistanceMetric::Euclidean).unwrap();

    let results = retrieve("who is ferris the crab", &mut embedder, &kb, 2).unwrap();
    assert_eq!(results[0].position, 0);

    let norm: f32 = embedder
        .vector("chance of rain later")
        .iter()
        .map(|v| v * v)
        .sum::<f32>()
        .sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
}

#[test]
fn test_one_batch_for_indexing() {
    let mut embedder = HashEmbedder::new(8);
    let kb = build(&mut embedder);
    assert!(kb.len() > 1);
    assert_eq!(embedder.batches(), 1);
}

#[test]
fn test_zero_k_is_rejected() {
    let mut embedder = HashEmbedder::new(8);
    let kb = build(&mut embedder);
    assert!(matches!(
        retrieve("anything", &mut embedder, &kb, 0),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn test_query_dimension_mismatch() {
    let mut index_embedder = HashEmbedder::new(32);
    let kb = build(&mut index_embedder);

    let mut other = HashEmbedder::new(16);
    assert!(matches!(
        retrieve("ownership", &mut other, &kb, 2),
        Err(AppError::DimensionMismatch {
            expected: 32,
            actual: 16
        })
    ));
}

#[test]
fn test_empty_knowledge_base() {
    let mut embedder = HashEmbedder::new(8);
    let kb = KnowledgeBase::build(Vec::new(), &mut embedder, DistanceMetric::Euclidean).unwrap();
    assert!(retrieve("anything", &mut embedder, &kb, 2)
        .unwrap()
        .is_empty());
    assert_eq!(embedder.batches(), 0);
}

#[test]
fn test_embedding_failure_propagates() {
    let chunks = vec![Chunk {
        position: 0,
        text: "text".to_string(),
    }];
    assert!(matches!(
        KnowledgeBase::build(chunks, &mut FailingEmbedder, DistanceMetric::Euclidean),
        Err(AppError::Embedding(_))
    ));
}

#[test]
fn test_cosine_metric() {
    let mut embedder = HashEmbedder::new(32);
    let chunker = TextChunker::new(8, 2).unwrap();
    let kb = KnowledgeBase::build(
        chunk_document(&chunker, DOC),
        &mut embedder,
        DistanceMetric::Cosine,
    )
    .unwrap();

    let results = retrieve("clap derive macro", &mut embedder, &kb, 2).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].distance <= results[1].distance);
    assert_eq!(kb.metric(), DistanceMetric::Cosine);
}
