use criterion::{Criterion, criterion_group, criterion_main};
use docs_qa::embeddings::chunking::{ChunkingConfig, split_text};
use std::hint::black_box;

fn lecture_text() -> String {
    let paragraph = "The Schrodinger equation describes how the quantum state of a physical \
                     system changes over time.\nIts solutions are wave functions, and their \
                     squared magnitude gives a probability density.";
    (0..200)
        .map(|i| format!("Section {}\n{}", i, paragraph))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = lecture_text();
    let unbroken = "x".repeat(50_000);
    let config = ChunkingConfig::default();

    c.bench_function("split_paragraphs", |b| {
        b.iter(|| split_text(black_box(&text), black_box(&config)))
    });
    c.bench_function("split_hard_cut", |b| {
        b.iter(|| split_text(black_box(&unbroken), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
