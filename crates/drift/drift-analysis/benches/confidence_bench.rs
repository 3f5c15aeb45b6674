//! Confidence scoring and audit benchmarks.
//! Run with: cargo bench -p drift-analysis --bench confidence_bench

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use drift_analysis::enforcement::audit::AuditEngine;
use drift_analysis::patterns::confidence::{ConfidenceInput, ConfidenceScorer};
use drift_analysis::patterns::{Pattern, PatternLocation, PatternMetadata, PatternStatus};

fn inputs(n: u64) -> Vec<ConfidenceInput> {
    (0..n)
        .map(|i| ConfidenceInput {
            occurrences: i % 50,
            total_locations: 50,
            variance: (i % 10) as f64 / 10.0,
            days_since_first_seen: (i % 45) as f64,
            file_count: i % 20,
            total_files: 20,
        })
        .collect()
}

fn patterns(n: usize) -> Vec<Pattern> {
    let scorer = ConfidenceScorer::default();
    inputs(n as u64)
        .iter()
        .enumerate()
        .map(|(i, input)| Pattern {
            id: format!("p{i}"),
            name: format!("pattern {i}"),
            category: format!("cat{}", i % 8),
            confidence: scorer.calculate_confidence(input),
            locations: (0..(i % 7) as u32)
                .map(|l| PatternLocation::new(format!("src/f{}.ts", i % 30), l + 1, 1))
                .collect(),
            outliers: Vec::new(),
            status: PatternStatus::Discovered,
            metadata: PatternMetadata::seen_at(Utc::now()),
        })
        .collect()
}

fn score_batch(c: &mut Criterion) {
    let scorer = ConfidenceScorer::default();
    let batch = inputs(10_000);
    c.bench_function("calculate_confidence_10k", |b| {
        b.iter(|| {
            batch
                .iter()
                .map(|i| scorer.calculate_confidence(i).score)
                .sum::<f64>()
        });
    });
}

fn run_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_audit");
    group.sample_size(10);
    let engine = AuditEngine::default();

    for size in [100, 1000] {
        let set = patterns(size);
        group.bench_with_input(BenchmarkId::new("patterns", size), &size, |b, _| {
            b.iter(|| engine.run_audit(&set));
        });
    }
    group.finish();
}

criterion_group!(benches, score_batch, run_audit);
criterion_main!(benches);
