use criterion::{criterion_group, criterion_main, Criterion};
use finsearch_core::text::{process_word, tokenize};

const SAMPLE: &str = "Acme Corporation reported rising quarterly profits on Tuesday, \
    beating analyst expectations as demand for its industrial products surged. \
    Shares rose 4 percent in early trading while rivals fell. Chief executive \
    Jane Doe said the company was expanding capacity and hiring aggressively, \
    though supply chains remained stretched across the sector.";

fn bench_text_pipeline(c: &mut Criterion) {
    c.bench_function("tokenize_article", |b| b.iter(|| tokenize(SAMPLE)));
    c.bench_function("process_words", |b| {
        let tokens = tokenize(SAMPLE);
        b.iter(|| tokens.iter().map(|t| process_word(t)).filter(|t| !t.is_empty()).count())
    });
}

criterion_group!(benches, bench_text_pipeline);
criterion_main!(benches);
