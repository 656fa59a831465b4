use super::*;
use std::path::PathBuf;

fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        chunk_size,
        chunk_overlap,
    }
}

fn document(content: &str, page: u32) -> Document {
    Document {
        content: content.to_string(),
        metadata: DocumentMetadata {
            source: PathBuf::from("paper.pdf"),
            page,
        },
    }
}

/// Text with no separators, so every cut is a hard character cut
fn unbroken_text(len: usize) -> String {
    ('a'..='z').cycle().take(len).collect()
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_text("Hello world.", &ChunkingConfig::default());
    assert_eq!(chunks, vec!["Hello world."]);
}

#[test]
fn blank_text_has_no_chunks() {
    assert!(split_text("", &ChunkingConfig::default()).is_empty());
    assert!(split_text("   \n\n  ", &config(10, 2)).is_empty());
}

#[test]
fn hard_cut_chunk_count() {
    let config = ChunkingConfig::default();
    for len in [1001, 1800, 2500, 5000] {
        let chunks = split_text(&unbroken_text(len), &config);
        let expected = (len - 200).div_ceil(800);
        assert_eq!(chunks.len(), expected, "length {}", len);
    }

    assert_eq!(split_text(&unbroken_text(1000), &config).len(), 1);
    assert_eq!(split_text(&unbroken_text(37), &config).len(), 1);
}

#[test]
fn hard_cut_chunks_share_exact_overlap() {
    let config = ChunkingConfig::default();
    let chunks = split_text(&unbroken_text(5000), &config);

    for pair in chunks.windows(2) {
        let previous: Vec<char> = pair[0].chars().collect();
        let next: Vec<char> = pair[1].chars().collect();
        assert_eq!(previous.len(), 1000);
        assert_eq!(&previous[previous.len() - 200..], &next[..200]);
    }
}

#[test]
fn paragraphs_are_preferred_boundaries() {
    let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird one.";
    let chunks = split_text(text, &config(30, 0));
    assert_eq!(
        chunks,
        vec!["First paragraph here.", "Second paragraph here.", "Third one."]
    );
}

#[test]
fn lines_are_used_when_there_are_no_paragraphs() {
    let chunks = split_text("line one\nline two\nline three", &config(12, 0));
    assert_eq!(chunks, vec!["line one", "line two", "line three"]);
}

#[test]
fn word_boundaries_with_overlap() {
    let text = "one two three four five six seven eight nine ten";

    let chunks = split_text(text, &config(15, 5));
    assert_eq!(
        chunks,
        vec!["one two three", "four five six", "six seven", "eight nine ten"]
    );

    let chunks = split_text(text, &config(15, 0));
    assert_eq!(
        chunks,
        vec!["one two three", "four five six", "seven eight", "nine ten"]
    );
}

#[test]
fn chunks_never_exceed_chunk_size() {
    let text = "Quantum superposition describes a system existing in several states at once. "
        .repeat(60);
    let config = config(200, 40);

    let chunks = split_text(&text, &config);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(char_len(chunk) <= 200, "chunk too long: {}", char_len(chunk));
        assert_eq!(chunk.trim(), chunk);
    }
}

#[test]
fn lengths_are_counted_in_characters() {
    let text = "é".repeat(1500);
    let lengths: Vec<usize> = split_text(&text, &ChunkingConfig::default())
        .iter()
        .map(|c| char_len(c))
        .collect();
    assert_eq!(lengths, vec![1000, 700]);
}

#[test]
fn splitting_is_deterministic() {
    let text = "Entanglement links particles.\n\n".repeat(100);
    let config = config(120, 30);
    assert_eq!(split_text(&text, &config), split_text(&text, &config));
}

#[test]
fn split_documents_keeps_metadata_and_restarts_indices() {
    let documents = vec![
        document("First paragraph here.\n\nSecond paragraph here.", 1),
        document("", 2),
        document("Third one.", 3),
    ];

    let chunks = split_documents(&documents, &config(30, 0));

    assert_eq!(chunks.len(), 3);
    assert_eq!(
        chunks
            .iter()
            .map(|c| (c.metadata.page, c.chunk_index))
            .collect::<Vec<_>>(),
        vec![(1, 0), (1, 1), (3, 0)]
    );
    assert_eq!(chunks[2].content, "Third one.");
}

fn hard_cut_bound(len: usize, config: &ChunkingConfig) -> usize {
    (len - config.chunk_overlap).div_ceil(config.chunk_size - config.chunk_overlap)
}

#[test]
fn regular_prose_stays_within_hard_cut_count() {
    let config = config(50, 10);
    let text = "word ".repeat(2000);

    let chunks = split_text(&text, &config);

    assert_eq!(chunks.len(), 250);
    assert!(chunks.len() <= hard_cut_bound(char_len(&text), &config));
    assert!(chunks.iter().all(|c| char_len(c) <= 50));
}

#[test]
fn word_boundaries_can_exceed_hard_cut_count() {
    let config = config(10, 2);
    let text = "alpha gamma delta";

    let chunks = split_text(text, &config);

    // Whole words are never cut to fill a chunk, so three chunks against a bound of two
    assert_eq!(hard_cut_bound(char_len(text), &config), 2);
    assert_eq!(chunks, vec!["alpha", "gamma", "delta"]);
}
