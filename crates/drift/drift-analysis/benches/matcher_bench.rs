//! Matcher benchmarks: cold vs cached `match_all` over a mixed catalog.
//! Run with: cargo bench -p drift-analysis --bench matcher_bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use drift_analysis::matcher::{
    AstMatchConfig, AstNode, MatchOptions, MatchStrategy, MatcherContext, MatcherOptions,
    PatternDefinition, PatternMatcher, Position, RegexMatchConfig, StructuralMatchConfig,
};

fn catalog() -> Vec<PatternDefinition> {
    vec![
        PatternDefinition::new(
            "todo",
            MatchStrategy::Regex(RegexMatchConfig {
                pattern: r"TODO:\s*(\w+)".into(),
                flags: "i".into(),
                ..Default::default()
            }),
        ),
        PatternDefinition::new(
            "fn-decl",
            MatchStrategy::Ast(AstMatchConfig {
                node_type: "function_declaration".into(),
                ..Default::default()
            }),
        ),
        PatternDefinition::new(
            "ts-service",
            MatchStrategy::Structural(StructuralMatchConfig {
                path_pattern: Some("src/**/*.ts".into()),
                extension: Some("ts".into()),
                ..Default::default()
            }),
        ),
    ]
}

fn context(lines: usize) -> MatcherContext {
    let content: String = (0..lines)
        .map(|i| format!("export function fn_{i}(x: number) {{ return x; }} // TODO: tidy\n"))
        .collect();
    let mut root = AstNode::new("program", "");
    for i in 0..lines as u32 {
        let pos = Position { row: i, column: 0 };
        root = root.with_child(AstNode::new("function_declaration", format!("fn_{i}")).at(pos, pos));
    }
    MatcherContext::new("src/services/user.ts", "typescript", content).with_ast(root)
}

fn match_all_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_all_cold");
    let patterns = catalog();

    for lines in [100, 1000] {
        let ctx = context(lines);
        let options = MatchOptions {
            use_cache: false,
            ..MatchOptions::default()
        };
        group.bench_with_input(BenchmarkId::new("lines", lines), &lines, |b, _| {
            let matcher = PatternMatcher::new(MatcherOptions::default());
            b.iter(|| matcher.match_all(&ctx, &patterns, &options));
        });
    }
    group.finish();
}

fn match_all_cached(c: &mut Criterion) {
    let patterns = catalog();
    let ctx = context(1000);
    let matcher = PatternMatcher::new(MatcherOptions::default());
    let options = MatchOptions::default();
    matcher.match_all(&ctx, &patterns, &options);

    c.bench_function("match_all_cached_1000", |b| {
        b.iter(|| matcher.match_all(&ctx, &patterns, &options));
    });
}

criterion_group!(benches, match_all_cold, match_all_cached);
criterion_main!(benches);
