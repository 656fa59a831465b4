use super::*;
use crate::documents::DocumentMetadata;
use crate::testing::{FailingEmbedder, LetterEmbedder};
use std::path::PathBuf;

fn chunk(content: &str, chunk_index: usize) -> TextChunk {
    TextChunk {
        content: content.to_string(),
        metadata: DocumentMetadata {
            source: PathBuf::from("notes.pdf"),
            page: 1,
        },
        chunk_index,
    }
}

fn sample_index() -> VectorIndex {
    VectorIndex::from_embeddings(
        vec![chunk("east", 0), chunk("north", 1), chunk("north-east", 2)],
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
    )
    .expect("index builds")
}

#[test]
fn search_orders_by_cosine_similarity() {
    let index = sample_index();

    let results = index
        .search_similar(&[0.0, 2.0], 3)
        .expect("search succeeds");

    let contents: Vec<_> = results.iter().map(|r| r.chunk.content.as_str()).collect();
    assert_eq!(contents, vec!["north", "north-east", "east"]);
    assert!((results[0].similarity_score - 1.0).abs() < 1e-6);
    assert!((results[1].similarity_score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    assert!(results[2].similarity_score.abs() < 1e-6);
}

#[test]
fn search_respects_limit() {
    let index = sample_index();
    assert_eq!(index.search_similar(&[1.0, 0.0], 2).expect("search").len(), 2);
    assert_eq!(index.search_similar(&[1.0, 0.0], 10).expect("search").len(), 3);
    assert!(index.search_similar(&[1.0, 0.0], 0).expect("search").is_empty());
}

#[test]
fn ties_keep_insertion_order() {
    let index = VectorIndex::from_embeddings(
        vec![chunk("first", 0), chunk("second", 1), chunk("third", 2)],
        vec![vec![1.0, 0.0], vec![2.0, 0.0], vec![0.5, 0.0]],
    )
    .expect("index builds");

    let results = index.search_similar(&[3.0, 0.0], 3).expect("search");
    let order: Vec<_> = results.iter().map(|r| r.chunk.chunk_index).collect();
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn zero_vectors_score_zero() {
    let index = VectorIndex::from_embeddings(
        vec![chunk("blank", 0), chunk("real", 1)],
        vec![vec![0.0, 0.0], vec![1.0, 0.0]],
    )
    .expect("index builds");

    let results = index.search_similar(&[1.0, 0.0], 2).expect("search");
    assert_eq!(results[0].chunk.content, "real");
    assert!(results[1].similarity_score.abs() < f32::EPSILON);
}

#[test]
fn construction_validates_vectors() {
    let count_mismatch =
        VectorIndex::from_embeddings(vec![chunk("a", 0), chunk("b", 1)], vec![vec![1.0]]);
    assert!(matches!(count_mismatch, Err(DocsQaError::Index(_))));

    let dimension_mismatch = VectorIndex::from_embeddings(
        vec![chunk("a", 0), chunk("b", 1)],
        vec![vec![1.0, 0.0], vec![1.0]],
    );
    assert!(matches!(dimension_mismatch, Err(DocsQaError::Index(_))));

    let empty_vector = VectorIndex::from_embeddings(vec![chunk("a", 0)], vec![vec![]]);
    assert!(matches!(empty_vector, Err(DocsQaError::Index(_))));
}

#[test]
fn query_dimension_must_match() {
    let index = sample_index();
    assert!(index.search_similar(&[1.0, 0.0, 0.0], 2).is_err());
}

#[test]
fn empty_index_is_searchable() {
    let index = VectorIndex::from_embeddings(Vec::new(), Vec::new()).expect("empty index builds");
    assert!(index.is_empty());
    assert_eq!(index.dimension(), None);
    assert!(index.search_similar(&[1.0], 4).expect("search").is_empty());
}

#[test]
fn retriever_embeds_query_text() {
    let embedder = LetterEmbedder::default();
    let texts = ["zzz zzz", "aaa bbb", "quantum"];
    let index = VectorIndex::from_embeddings(
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| chunk(t, i))
            .collect(),
        texts.iter().map(|t| LetterEmbedder::vector(t)).collect(),
    )
    .expect("index builds");

    let results = index
        .as_retriever(&embedder, 1)
        .retrieve("zz")
        .expect("retrieval succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.content, "zzz zzz");
    assert_eq!(embedder.calls.get(), 1);
}

#[test]
fn retriever_skips_embedding_for_empty_index() {
    let index = VectorIndex::default();
    let results = index
        .as_retriever(&FailingEmbedder, DEFAULT_TOP_K)
        .retrieve("anything")
        .expect("empty index needs no embedding");
    assert!(results.is_empty());
}

#[test]
fn retriever_reports_embedding_failures() {
    let index = sample_index();
    let result = index.as_retriever(&FailingEmbedder, DEFAULT_TOP_K).retrieve("north");
    assert!(matches!(result, Err(DocsQaError::Embedding(_))));
}
