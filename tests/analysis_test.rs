//! Library-level properties of a full analysis
//!
//! Every test builds its corpus in memory and runs the public engine API.

use depsight::graph::ShortestPaths;
use depsight::{AnalysisEngine, AnalysisError, EngineConfig, FileFacts, ProjectAnalysis};
use std::collections::BTreeSet;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn analyze(files: &[FileFacts]) -> ProjectAnalysis {
    AnalysisEngine::new(EngineConfig::default())
        .expect("default config")
        .analyze(files)
        .expect("analysis")
}

/// Layered web app: two entry points, a service layer and a util cycle
fn sample_corpus() -> Vec<FileFacts> {
    vec![
        FileFacts::new("src/index.js")
            .with_dependencies(["./routes", "./services/users", "express"])
            .with_keyword("if", 3),
        FileFacts::new("src/routes.js")
            .with_dependencies(["./services/users", "./services/orders"])
            .with_keyword("switch", 1)
            .with_keyword("case", 6),
        FileFacts::new("src/services/users.js")
            .with_dependencies(["../util/db", "../util/log"])
            .with_keyword("if", 5)
            .with_keyword("&&", 2),
        FileFacts::new("src/services/orders.js")
            .with_dependencies(["../util/db", "./users"])
            .with_keyword("for", 2),
        FileFacts::new("src/util/db.js").with_dependencies(["./log"]),
        FileFacts::new("src/util/log.js").with_dependencies(["./db"]),
        FileFacts::new("scripts/seed.js").with_dependencies(["../src/util/db"]),
    ]
}

// ============================================================================
// Structural invariants
// ============================================================================

#[test]
fn test_matrix_is_square_binary() {
    let analysis = analyze(&sample_corpus());
    let matrix = &analysis.adjacency_matrix;
    assert_eq!(matrix.dim(), 7);
    assert_eq!(matrix.rows().len(), 7);
    for row in matrix.rows() {
        assert_eq!(row.len(), 7);
        assert!(row.iter().all(|&v| v == 0 || v == 1));
    }
    // "express" is unresolvable and dropped
    assert_eq!(analysis.global_metrics.edge_count, 11);
}

#[test]
fn test_scores_bounded() {
    let analysis = analyze(&sample_corpus());

    for cluster in &analysis.clusters {
        assert!((-1.0..=1.0).contains(&cluster.modularity));
        assert!((-1.0..=1.0).contains(&cluster.silhouette_score));
        assert!((0.0..=1.0).contains(&cluster.cohesion));
        assert!((0.0..=1.0).contains(&cluster.coupling));
    }

    let mut pagerank_sum = 0.0;
    for node in analysis.nodes.values() {
        let c = node.centrality.expect("centrality assigned");
        for v in [c.betweenness, c.closeness, c.eigenvector, c.pagerank] {
            assert!(v.is_finite() && v >= 0.0, "{}: {:?}", node.id, c);
        }
        assert!(c.pagerank <= 1.0);
        pagerank_sum += c.pagerank;
    }
    assert!((pagerank_sum - 1.0).abs() <= 0.1, "pagerank sum {}", pagerank_sum);

    let g = &analysis.global_metrics;
    assert!((0.0..=1.0).contains(&g.network_density));
    assert!((0.0..=1.0).contains(&g.clustering_coefficient));
    assert!((-1.0..=1.0).contains(&g.modularity_score));
    assert!(g.average_path_length >= 0.0);

    let q = &analysis.quality_metrics;
    for v in [q.structural_health, q.maintainability_score, q.evolutionary_risk, q.technical_debt] {
        assert!((0.0..=100.0).contains(&v));
    }
}

#[test]
fn test_clusters_partition_nodes() {
    let analysis = analyze(&sample_corpus());
    let mut seen = BTreeSet::new();
    for cluster in &analysis.clusters {
        for member in &cluster.members {
            assert!(seen.insert(member.clone()), "{} in two clusters", member);
        }
    }
    let ids: BTreeSet<String> = analysis.nodes.keys().cloned().collect();
    assert_eq!(seen, ids);
}

#[test]
fn test_cycle_reported_and_grade_capped() {
    let analysis = analyze(&sample_corpus());
    assert_eq!(
        analysis.cycles,
        vec![vec!["src/util/db.js".to_string(), "src/util/log.js".to_string()]]
    );
    assert_eq!(analysis.global_metrics.cycle_count, 1);
    assert!(!analysis.quality_metrics.grade.starts_with('A'));
    assert!(!analysis.quality_metrics.grade.starts_with('B'));
    assert!(analysis
        .action_plan
        .recommendations
        .iter()
        .any(|r| r.contains("circular dependency group")));
}

// ============================================================================
// Small graphs
// ============================================================================

#[test]
fn test_single_file() {
    let analysis = analyze(&[FileFacts::new("index.js")]);
    assert_eq!(analysis.nodes.len(), 1);
    assert!(!analysis.clusters.is_empty());
    assert_eq!(analysis.adjacency_matrix.edge_count(), 0);

    let g = &analysis.global_metrics;
    assert_eq!(g.average_path_length, 0.0);
    assert_eq!(g.network_density, 0.0);
    assert_eq!(g.clustering_coefficient, 0.0);

    let c = analysis.node("index.js").and_then(|n| n.centrality).expect("centrality");
    assert_eq!(c.betweenness, 0.0);
    assert_eq!(c.closeness, 0.0);
    assert_eq!(c.eigenvector, 0.0);
    assert_eq!(c.pagerank, 0.0);
}

#[test]
fn test_single_import() {
    let analysis = analyze(&[
        FileFacts::new("a.js").with_dependencies(["./b"]),
        FileFacts::new("b.js"),
    ]);
    assert_eq!(analysis.adjacency_matrix.edge_count(), 1);
    assert_eq!(analysis.node("b.js").expect("b").complexity.fan_in, 1);
    assert_eq!(analysis.node("a.js").expect("a").complexity.fan_out, 1);
    assert!(approx_eq(analysis.global_metrics.network_density, 0.5));
}

#[test]
fn test_mutual_imports_form_one_cluster() {
    let analysis = analyze(&[
        FileFacts::new("a.js").with_dependencies(["./b"]),
        FileFacts::new("b.js").with_dependencies(["./a"]),
    ]);
    assert_eq!(analysis.clusters.len(), 1);
    assert!(analysis.clusters[0].cohesion > 0.0);

    let paths = ShortestPaths::compute(&analysis.adjacency_matrix);
    assert_eq!(paths.distance(0, 1), Some(1));
    assert_eq!(paths.distance(1, 0), Some(1));
}

// ============================================================================
// Weights and determinism
// ============================================================================

#[test]
fn test_weight_monotone_in_cyclomatic() {
    let weight_for = |branches: usize| {
        let analysis = analyze(&[FileFacts::new("a.js").with_keyword("if", branches)]);
        analysis.node("a.js").expect("node").weight
    };
    let weights: Vec<f64> = [0, 1, 5, 20, 100].into_iter().map(weight_for).collect();
    for pair in weights.windows(2) {
        assert!(pair[1] >= pair[0], "{:?}", weights);
    }
    assert!(weights[4] > weights[0]);
}

#[test]
fn test_deterministic() {
    let first = analyze(&sample_corpus());
    let second = analyze(&sample_corpus());

    assert_eq!(first.adjacency_matrix, second.adjacency_matrix);
    let w1: Vec<f64> = first.nodes.values().map(|n| n.weight).collect();
    let w2: Vec<f64> = second.nodes.values().map(|n| n.weight).collect();
    assert_eq!(w1, w2);

    let members = |a: &ProjectAnalysis| -> Vec<Vec<String>> {
        a.clusters.iter().map(|c| c.members.clone()).collect()
    };
    assert_eq!(members(&first), members(&second));
    assert_eq!(first.clustering.algorithm, second.clustering.algorithm);
    assert_eq!(
        first.quality_metrics.composite_score(),
        second.quality_metrics.composite_score()
    );
    assert_eq!(first.quality_metrics.grade, second.quality_metrics.grade);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_corpus_rejected() {
    let engine = AnalysisEngine::new(EngineConfig::default()).unwrap();
    assert_eq!(engine.analyze(&[]).unwrap_err(), AnalysisError::EmptyCorpus);
}

#[test]
fn test_corpus_too_large_rejected() {
    let mut config = EngineConfig::default();
    config.limits.max_nodes = 2;
    let engine = AnalysisEngine::new(config).unwrap();
    let files: Vec<FileFacts> = (0..3).map(|i| FileFacts::new(format!("f{}.js", i))).collect();
    assert_eq!(
        engine.analyze(&files).unwrap_err(),
        AnalysisError::CorpusTooLarge { count: 3, max: 2 }
    );
}

#[test]
fn test_file_too_large_rejected() {
    let engine = AnalysisEngine::new(EngineConfig::default()).unwrap();
    let mut big = FileFacts::new("big.js");
    big.size_bytes = 6 * 1024 * 1024;
    let err = engine.analyze(&[FileFacts::new("a.js"), big]).unwrap_err();
    assert!(matches!(err, AnalysisError::FileTooLarge { ref path, .. } if path == "big.js"));
}

#[test]
fn test_debt_scan_disabled_by_config() {
    let files = [FileFacts::new("a.py").with_source("eval(x)  # TODO")];

    let mut config = EngineConfig::default();
    config.debt.enabled = false;
    let analysis = AnalysisEngine::new(config).unwrap().analyze(&files).unwrap();
    assert!(analysis.debt_items.is_empty());
    assert_eq!(analysis.action_plan.total_debt_items, 0);
    assert_eq!(analysis.action_plan.estimated_effort, "0 hours");

    let analysis = analyze(&files);
    let kinds: Vec<&str> = analysis.debt_items.iter().map(|d| d.kind.as_str()).collect();
    assert_eq!(kinds, vec!["todo", "unsafe-eval"]);
}
