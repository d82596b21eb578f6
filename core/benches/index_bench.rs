use boolcore::tokenizer::{index_lines, TokenizerOptions};
use boolcore::BooleanIndex;
use criterion::{criterion_group, criterion_main, Criterion};

fn corpus() -> Vec<String> {
    (0..2_000)
        .map(|i| format!("document {i} mentions term{} and term{} alongside shared words", i % 97, i % 13))
        .collect()
}

fn bench_ingest(c: &mut Criterion) {
    let lines = corpus();
    let opts = TokenizerOptions::default();
    c.bench_function("ingest_2k_lines", |b| {
        b.iter(|| {
            let mut index = BooleanIndex::new();
            index_lines(&mut index, lines.iter().map(String::as_str), 0, &opts);
            index
        })
    });
}

fn bench_feature_matrix(c: &mut Criterion) {
    let lines = corpus();
    let mut index = BooleanIndex::new();
    index_lines(&mut index, lines.iter().map(String::as_str), 0, &TokenizerOptions::default());
    c.bench_function("feature_matrix_2k_docs", |b| b.iter(|| index.generate_feature_matrix()));
}

criterion_group!(benches, bench_ingest, bench_feature_matrix);
criterion_main!(benches);
