//! Analysis orchestration
//!
//! ```text
//! FileFacts ─► GraphBuilder ─► AdjacencyMatrix ─► ShortestPaths
//!                                     │
//!                     ┌───────────────┴───────────────┐
//!                     ▼                               ▼
//!             CentralityEngine                ClusteringEngine   (rayon::join)
//!                     └───────────────┬───────────────┘
//!                                     ▼
//!                    GlobalMetrics ─► QualityAssessment ─► ProjectAnalysis
//!                                     ▲
//!                         DebtScanner ┘
//! ```

use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::centrality::CentralityEngine;
use crate::clustering::{ClusteringContext, ClusteringEngine, DetectorRegistry};
use crate::config::EngineConfig;
use crate::error::AnalysisResult;
use crate::graph::{find_cycles, AdjacencyMatrix, GraphBuilder, ShortestPaths};
use crate::models::{FileFacts, ProjectAnalysis};
use crate::scoring::{compute_global_metrics, DebtScanner, QualityAssessment};

/// Owns the immutable configuration and the detector registry.
///
/// One engine can analyze any number of corpora; each call is independent.
pub struct AnalysisEngine {
    config: EngineConfig,
    registry: DetectorRegistry,
}

impl AnalysisEngine {
    /// Validate the configuration and build the configured detectors
    pub fn new(config: EngineConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let registry = DetectorRegistry::from_config(&config.clustering)?;
        Ok(Self { config, registry })
    }

    /// Use a caller-supplied detector registry instead of the configured one
    pub fn with_registry(config: EngineConfig, registry: DetectorRegistry) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// Run the full pipeline over one corpus
    pub fn analyze(&self, files: &[FileFacts]) -> AnalysisResult<ProjectAnalysis> {
        let start = Instant::now();
        info!("Analyzing {} files", files.len());

        let mut nodes = GraphBuilder::new(&self.config).build(files)?;
        let matrix = AdjacencyMatrix::from_nodes(&nodes);
        let paths = ShortestPaths::compute(&matrix);
        debug!("Shortest paths ready after {:?}", start.elapsed());

        let clustering_ctx = ClusteringContext::new(&matrix, &nodes);
        let centrality = CentralityEngine::new(&self.config.centrality);
        let clustering = ClusteringEngine::new(&self.registry, &self.config.clustering.selection);

        let (scores, outcome) = rayon::join(
            || centrality.compute(&matrix, &paths),
            || clustering.run(&clustering_ctx),
        );

        for (i, node) in nodes.values_mut().enumerate() {
            node.centrality = Some(scores.node(i));
        }

        let cycles: Vec<Vec<String>> = find_cycles(&matrix, 2)
            .into_iter()
            .map(|group| group.into_iter().map(|i| matrix.id(i).to_string()).collect())
            .collect();
        if !cycles.is_empty() {
            debug!("Found {} circular dependency groups", cycles.len());
        }

        let global_metrics =
            compute_global_metrics(&nodes, &matrix, &paths, &outcome.clusters, cycles.len());

        // Duplicate paths collapse onto the first node, so scan only that one
        let mut seen = FxHashSet::default();
        let scanned: Vec<&FileFacts> = files.iter().filter(|f| seen.insert(f.path.as_str())).collect();
        let debt_items = DebtScanner::new(&self.config.debt).scan(&scanned);

        let assessment = QualityAssessment::new(&self.config.quality);
        let quality_metrics = assessment.assess(&nodes, &global_metrics, &outcome.clusters, &cycles);
        let action_plan = assessment.action_plan(
            &nodes,
            &global_metrics,
            &outcome.clusters,
            &cycles,
            &debt_items,
        );

        info!(
            "Analysis complete in {:.2}s: {} nodes, {} edges, {} clusters, grade {}",
            start.elapsed().as_secs_f64(),
            global_metrics.node_count,
            global_metrics.edge_count,
            outcome.clusters.len(),
            quality_metrics.grade
        );

        Ok(ProjectAnalysis {
            nodes,
            adjacency_matrix: matrix,
            clusters: outcome.clusters,
            clustering: outcome.summary,
            global_metrics,
            quality_metrics,
            cycles,
            debt_items,
            action_plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.centrality.damping = 0.0;
        assert!(matches!(
            AnalysisEngine::new(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_unknown_detector() {
        let mut config = EngineConfig::default();
        config.clustering.algorithms = vec!["louvain".into(), "magic".into()];
        assert!(AnalysisEngine::new(config).is_err());
    }

    #[test]
    fn test_every_node_gets_centrality() {
        let engine = AnalysisEngine::new(EngineConfig::default()).unwrap();
        let analysis = engine
            .analyze(&[
                FileFacts::new("a.js").with_dependencies(["./b"]),
                FileFacts::new("b.js").with_dependencies(["./c"]),
                FileFacts::new("c.js"),
            ])
            .unwrap();
        assert!(analysis.nodes.values().all(|n| n.centrality.is_some()));
        assert_eq!(analysis.adjacency_matrix.dim(), 3);
        assert!(!analysis.quality_metrics.grade.is_empty());
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = DetectorRegistry::new();
        registry.register(Box::new(crate::clustering::HierarchicalDetector));
        let engine = AnalysisEngine::with_registry(EngineConfig::default(), registry).unwrap();
        assert_eq!(engine.detector_names(), vec!["hierarchical"]);

        let analysis = engine.analyze(&[FileFacts::new("a.js")]).unwrap();
        assert_eq!(analysis.clustering.algorithm, "hierarchical");
    }

    #[test]
    fn test_debt_feeds_priority_files() {
        let engine = AnalysisEngine::new(EngineConfig::default()).unwrap();
        let source = "result = eval(data)\n# TODO a\n# TODO b\n# TODO c\n# TODO d\n# TODO e";
        let analysis = engine
            .analyze(&[
                FileFacts::new("a.py").with_dependencies(["b"]).with_source(source),
                FileFacts::new("b.py"),
            ])
            .unwrap();

        assert_eq!(analysis.debt_items.len(), 6);
        assert!(analysis.debt_items.iter().all(|d| d.file == "a.py"));
        assert_eq!(analysis.action_plan.total_debt_items, 6);
        assert_eq!(analysis.action_plan.severity_breakdown.critical, 1);

        let top = &analysis.action_plan.priority_files[0];
        assert_eq!(top.file, "a.py");
        assert_eq!(top.debt_count, 6);
        assert!(analysis.action_plan.recommendations[0].starts_with("Address 1 critical"));
    }

    #[test]
    fn test_duplicate_paths_scanned_once() {
        let engine = AnalysisEngine::new(EngineConfig::default()).unwrap();
        let analysis = engine
            .analyze(&[
                FileFacts::new("a.py").with_source("# TODO"),
                FileFacts::new("a.py").with_source("# TODO"),
            ])
            .unwrap();
        assert_eq!(analysis.debt_items.len(), 1);
    }
}
