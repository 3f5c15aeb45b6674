//! Audit engine integration: matcher output through aggregation, scoring
//! and audit, plus engine-level properties.

use chrono::{Duration, TimeZone, Utc};
use drift_analysis::enforcement::audit::{
    AlertSeverity, AlertType, AuditContext, AuditEngine, AuditEngineConfig, CallGraphIndex,
    DegradationDetector, IssueType, Recommendation, TrendDirection,
};
use drift_analysis::matcher::{
    MatchOptions, MatchStrategy, MatcherContext, PatternDefinition, PatternMatcher,
    RegexMatchConfig,
};
use drift_analysis::patterns::aggregation::grouper::MatchAggregator;
use drift_analysis::patterns::confidence::{ConfidenceScore, ConfidenceScorer};
use drift_analysis::patterns::{Pattern, PatternLocation, PatternMetadata, PatternStatus};
use drift_core::config::AuditConfig;
use proptest::prelude::*;

fn pattern(id: &str, category: &str, confidence: f64, lines: &[u32]) -> Pattern {
    Pattern {
        id: id.into(),
        name: id.into(),
        category: category.into(),
        confidence: ConfidenceScore::from_value(confidence),
        locations: lines.iter().map(|l| PatternLocation::new("src/a.ts", *l, 1)).collect(),
        outliers: Vec::new(),
        status: PatternStatus::Discovered,
        metadata: PatternMetadata::seen_at(Utc::now()),
    }
}

#[test]
fn test_empty_audit_is_fully_populated() {
    let result = AuditEngine::default().run_audit(&[]);
    assert_eq!(result.summary.health_score, 100.0);
    assert!(result.patterns.is_empty());
    assert!(result.duplicates.is_empty());
    assert!(result.cross_validation.issues.is_empty());
    assert!(result.degradation.is_none());
}

#[test]
fn test_scan_hash_tracks_pattern_state() {
    let engine = AuditEngine::default();
    let patterns = vec![pattern("a", "api", 0.9, &[1, 2, 3]), pattern("b", "auth", 0.8, &[4])];

    let first = engine.run_audit(&patterns);
    let second = engine.run_audit(&patterns);
    assert_eq!(first.scan_hash, second.scan_hash);

    let mut changed = patterns.clone();
    changed[0].confidence = ConfidenceScore::from_value(0.91);
    assert_ne!(engine.run_audit(&changed).scan_hash, first.scan_hash);
}

#[test]
fn test_high_confidence_pattern_is_auto_approved_until_duplicated() {
    let engine = AuditEngine::default();

    let alone = engine.run_audit(&[pattern("a", "api", 0.95, &[1, 2, 3])]);
    assert_eq!(alone.patterns[0].recommendation, Recommendation::AutoApprove);
    assert!(alone.patterns[0].reasons[0].contains("High confidence"));

    let paired = engine.run_audit(&[
        pattern("a", "api", 0.95, &[1, 2, 3]),
        pattern("b", "api", 0.95, &[1, 2, 3]),
    ]);
    assert_eq!(paired.duplicates.len(), 1);
    assert!(paired.duplicates[0].similarity > 0.0);
    assert!(paired.patterns.iter().all(|p| p.recommendation == Recommendation::Review));
}

#[test]
fn test_engine_honours_audit_config() {
    let config = AuditConfig {
        auto_approve_threshold: Some(0.80),
        min_locations_for_established: Some(1),
        ..AuditConfig::default()
    };
    let engine = AuditEngine::from_config(&config);
    let result = engine.run_audit(&[pattern("a", "api", 0.85, &[1])]);
    assert_eq!(result.patterns[0].recommendation, Recommendation::AutoApprove);
}

#[test]
fn test_call_graph_context_feeds_health() {
    let engine = AuditEngine::new(AuditEngineConfig::default());
    let patterns = vec![pattern("a", "api", 1.0, &[1]), {
        let mut p = pattern("b", "auth", 1.0, &[2]);
        p.locations[0].file = "src/other.ts".into();
        p
    }];
    let context = AuditContext {
        call_graph: Some(CallGraphIndex::from_files(["src/a.ts"])),
        constraints: Vec::new(),
    };
    let result = engine.run_audit_with(&patterns, &context, Utc::now());
    assert_eq!(result.cross_validation.patterns_matching_call_graph, 1);
    assert_eq!(result.cross_validation.patterns_not_in_call_graph, 1);
    assert!(result
        .cross_validation
        .issues
        .iter()
        .any(|i| i.issue_type == IssueType::NotInCallGraph));
    assert_eq!(result.summary.health_breakdown.cross_validation_rate, 0.5);
}

#[test]
fn test_matcher_output_flows_into_audit() {
    let matcher = PatternMatcher::default();
    let definitions = vec![PatternDefinition {
        category: "logging".into(),
        ..PatternDefinition::new(
            "console-log",
            MatchStrategy::Regex(RegexMatchConfig {
                pattern: r"console\.log".into(),
                ..Default::default()
            }),
        )
    }];

    let mut aggregator = MatchAggregator::new();
    for i in 0..4 {
        let ctx = MatcherContext::new(
            format!("src/f{i}.ts"),
            "typescript",
            "console.log(1);\nconsole.log(2);\n",
        );
        aggregator.add_all(&matcher.match_all(&ctx, &definitions, &MatchOptions::default()).matches);
    }

    let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let metadata = PatternMetadata::seen_at(now - Duration::days(60));
    let pattern = aggregator
        .build_pattern("console-log", "console.log", "logging", metadata, &ConfidenceScorer::default(), 0.5, now)
        .unwrap();
    assert_eq!(pattern.location_count(), 8);
    assert!((pattern.confidence.score - 1.0).abs() < 1e-12);

    let result = AuditEngine::default().run_audit_at(&[pattern], now);
    assert_eq!(result.generated_at, now);
    assert_eq!(result.summary.auto_approve_eligible, 1);
}

#[test]
fn test_consecutive_audits_compare() {
    let engine = AuditEngine::default();
    let good = engine.run_audit(&[pattern("a", "api", 0.95, &[1, 2, 3])]);
    let worse = engine.run_audit(&[pattern("a", "api", 0.2, &[])]);

    let result = DegradationDetector::default().compare(&worse, &good);
    assert_eq!(result.trend, TrendDirection::Declining);
    assert!(result
        .alerts
        .iter()
        .any(|a| a.alert_type == AlertType::HealthDrop && a.severity == AlertSeverity::Critical));
    assert!(result.new_issues.iter().any(|m| m.contains("no locations")));
}

#[test]
fn test_audit_result_json_uses_kebab_tags() {
    let result = AuditEngine::default().run_audit(&[pattern("a", "api", 0.95, &[1, 2, 3])]);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["patterns"][0]["recommendation"], "auto-approve");
    assert!(json["summary"]["healthScore"].is_number());
    assert!(json.get("degradation").is_none());
}

proptest! {
    #[test]
    fn test_health_score_is_bounded(
        specs in prop::collection::vec((0.0f64..=1.0, 0u32..6, 0usize..4, any::<bool>()), 0..12)
    ) {
        let patterns: Vec<Pattern> = specs
            .iter()
            .enumerate()
            .map(|(i, (confidence, locations, outliers, approved))| {
                let mut p = pattern(&format!("p{i}"), if i % 2 == 0 { "api" } else { "auth" }, *confidence, &(1..=*locations).collect::<Vec<_>>());
                p.outliers = (0..*outliers).map(|o| PatternLocation::new("src/b.ts", o as u32 + 1, 1)).collect();
                if *approved {
                    p.status = PatternStatus::Approved;
                }
                p
            })
            .collect();

        let result = AuditEngine::default().run_audit(&patterns);
        prop_assert!((0.0..=100.0).contains(&result.summary.health_score));
        prop_assert_eq!(result.patterns.len(), patterns.len());
        let counted = result.summary.auto_approve_eligible
            + result.summary.flagged_for_review
            + result.summary.likely_false_positives;
        prop_assert_eq!(counted, patterns.len());
    }
}
