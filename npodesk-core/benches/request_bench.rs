//! Criterion benchmarks for request-composition hot paths.
//!
//! Benchmarks:
//! 1. Screening request fingerprint (serialize + blake3)
//! 2. Term parsing over large pasted inputs
//! 3. Filter composer serialization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use npodesk_core::domain::FiscalPeriod;
use npodesk_core::filters::{FilterComposer, ModuleKind};
use npodesk_core::screening::ScreeningRequest;
use npodesk_core::search::{parse_terms, TermType};

// ── Helpers ──────────────────────────────────────────────────────────

fn full_composer() -> FilterComposer {
    let mut composer = FilterComposer::new();
    composer.set_enabled(ModuleKind::Geographic, true);
    composer.set_state(Some("CA".into())).unwrap();
    composer.set_city(Some("LOS ANGELES".into())).unwrap();
    composer.set_enabled(ModuleKind::Financial, true);
    composer
        .set_revenue_range(Some(1_000_000.0), Some(50_000_000.0))
        .unwrap();
    composer
        .set_assets_range(Some(5_000_000.0), None)
        .unwrap();
    composer.set_enabled(ModuleKind::Operational, true);
    composer.set_ilu_range(Some(50), Some(500)).unwrap();
    composer
}

fn pasted_terms(n: usize) -> String {
    (0..n)
        .map(|i| format!("  {:02}-{:07}  \n\n", i % 100, i))
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_fingerprint(c: &mut Criterion) {
    let period = FiscalPeriod {
        year: 2023,
        month: Some(6),
    };
    let criteria = ScreeningRequest::criteria(period, full_composer().serialize());
    let explicit = ScreeningRequest::explicit(
        period,
        parse_terms(&pasted_terms(200)),
        TermType::Ein,
    );

    c.bench_function("fingerprint_criteria", |b| {
        b.iter(|| black_box(&criteria).fingerprint())
    });
    c.bench_function("fingerprint_explicit_200_terms", |b| {
        b.iter(|| black_box(&explicit).fingerprint())
    });
}

fn bench_parse_terms(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_terms");
    for n in [10usize, 100, 1000] {
        let input = pasted_terms(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| parse_terms(black_box(input)))
        });
    }
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let composer = full_composer();
    c.bench_function("composer_serialize", |b| {
        b.iter(|| black_box(&composer).serialize())
    });
}

criterion_group!(benches, bench_fingerprint, bench_parse_terms, bench_serialize);
criterion_main!(benches);
