//! Community detection
//!
//! Detectors implement [`CommunityDetector`] and live in a
//! [`DetectorRegistry`]. The [`ClusteringEngine`] runs every registered
//! detector in parallel, replaces failed or invalid results with the
//! hierarchical fallback, scores each candidate partition and keeps the best.
//!
//! A partition is one community label per node, in adjacency-matrix order.

mod greedy;
mod hierarchical;
mod louvain;
pub mod metrics;
mod spectral;

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::config::{ClusteringConfig, SelectionWeights};
use crate::error::{AlgorithmFailure, AnalysisError, AnalysisResult};
use crate::graph::AdjacencyMatrix;
use crate::models::{CandidateScore, ClusterResult, ClusteringSummary, GraphNode};

pub use greedy::GreedyModularityDetector;
pub use hierarchical::HierarchicalDetector;
pub use louvain::LouvainDetector;
pub use metrics::cluster_metrics;
pub use spectral::SpectralDetector;

/// Community label per node
pub type Partition = Vec<usize>;

/// Number of complexity features used for node distances
pub const FEATURE_COUNT: usize = 5;

/// Read-only inputs shared by every detector
pub struct ClusteringContext<'a> {
    pub matrix: &'a AdjacencyMatrix,
    /// Undirected neighbour lists (A or Aᵀ)
    pub neighbors: Vec<Vec<usize>>,
    /// Min-max normalized complexity features per node
    pub features: Vec<[f64; FEATURE_COUNT]>,
}

impl<'a> ClusteringContext<'a> {
    pub fn new(matrix: &'a AdjacencyMatrix, nodes: &IndexMap<String, GraphNode>) -> Self {
        let raw: Vec<[f64; FEATURE_COUNT]> = matrix
            .order()
            .iter()
            .map(|id| {
                nodes
                    .get(id)
                    .map(|node| {
                        let c = &node.complexity;
                        [
                            c.cyclomatic_complexity,
                            c.cognitive_complexity,
                            c.halstead_volume,
                            c.maintainability_index,
                            c.coupling_between_objects as f64,
                        ]
                    })
                    .unwrap_or([0.0; FEATURE_COUNT])
            })
            .collect();

        Self::with_features(matrix, raw)
    }

    /// Build from raw (unnormalized) feature rows
    pub fn with_features(matrix: &'a AdjacencyMatrix, raw: Vec<[f64; FEATURE_COUNT]>) -> Self {
        Self {
            matrix,
            neighbors: matrix.undirected_neighbors(),
            features: normalize_features(raw),
        }
    }

    pub fn len(&self) -> usize {
        self.matrix.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Number of undirected edges
    pub fn undirected_edges(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Euclidean distance between two nodes' feature vectors
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        euclidean(&self.features[i], &self.features[j])
    }
}

pub(crate) fn euclidean(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Scale each feature column onto [0, 1]; constant columns become 0
fn normalize_features(mut rows: Vec<[f64; FEATURE_COUNT]>) -> Vec<[f64; FEATURE_COUNT]> {
    for col in 0..FEATURE_COUNT {
        let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r[col]), hi.max(r[col]))
        });
        let range = max - min;
        for row in rows.iter_mut() {
            row[col] = if range > 0.0 && range.is_finite() {
                (row[col] - min) / range
            } else {
                0.0
            };
        }
    }
    rows
}

/// A community detection algorithm
pub trait CommunityDetector: Send + Sync {
    /// Stable identifier used in configuration and reports
    fn name(&self) -> &'static str;

    fn detect(&self, ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure>;
}

/// Ordered set of detectors; order breaks score ties
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn CommunityDetector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, detector: Box<dyn CommunityDetector>) {
        self.detectors.push(detector);
    }

    /// Build the registry named by the clustering configuration
    pub fn from_config(config: &ClusteringConfig) -> AnalysisResult<Self> {
        let mut registry = Self::new();
        for name in &config.algorithms {
            let detector: Box<dyn CommunityDetector> = match name.as_str() {
                "louvain" => Box::new(LouvainDetector::new(config.louvain_max_iterations)),
                "spectral" => Box::new(SpectralDetector::new(
                    config.spectral_tolerance,
                    config.spectral_max_iterations,
                )),
                "greedy-modularity" | "greedy" => {
                    Box::new(GreedyModularityDetector::new(config.greedy_max_moves))
                }
                "hierarchical" => Box::new(HierarchicalDetector),
                other => {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "unknown clustering algorithm '{}'",
                        other
                    )))
                }
            };
            registry.register(detector);
        }
        Ok(registry)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

/// Winning partition with its per-cluster metrics
#[derive(Debug, Clone)]
pub struct ClusteringOutcome {
    pub partition: Partition,
    pub clusters: Vec<ClusterResult>,
    pub summary: ClusteringSummary,
}

struct Candidate {
    name: &'static str,
    partition: Partition,
    clusters: Vec<ClusterResult>,
    score: f64,
    fallback: bool,
}

pub struct ClusteringEngine<'a> {
    registry: &'a DetectorRegistry,
    weights: &'a SelectionWeights,
}

impl<'a> ClusteringEngine<'a> {
    pub fn new(registry: &'a DetectorRegistry, weights: &'a SelectionWeights) -> Self {
        Self { registry, weights }
    }

    /// Run every detector and keep the highest scoring partition
    pub fn run(&self, ctx: &ClusteringContext) -> ClusteringOutcome {
        let n = ctx.len();
        let fallback: OnceLock<Partition> = OnceLock::new();
        let fallback_partition = || {
            fallback
                .get_or_init(|| {
                    HierarchicalDetector
                        .detect(ctx)
                        .map(renumber)
                        .unwrap_or_else(|_| vec![0; n])
                })
                .clone()
        };

        let candidates: Vec<Candidate> = self
            .registry
            .detectors
            .par_iter()
            .map(|detector| {
                let name = detector.name();
                let (partition, fallback) =
                    match detector.detect(ctx).and_then(|p| validate_partition(p, n)) {
                        Ok(p) => (renumber(p), false),
                        Err(e) => {
                            warn!("Clustering '{}' failed, using hierarchical fallback: {}", name, e);
                            (fallback_partition(), true)
                        }
                    };
                let clusters = cluster_metrics(ctx, &partition);
                let score = self.score(&clusters);
                debug!("Clustering '{}': {} clusters, score {:.4}", name, clusters.len(), score);
                Candidate {
                    name,
                    partition,
                    clusters,
                    score,
                    fallback,
                }
            })
            .collect();

        let summaries: Vec<CandidateScore> = candidates
            .iter()
            .map(|c| CandidateScore {
                algorithm: c.name.to_string(),
                score: c.score,
                cluster_count: c.clusters.len(),
                fallback: c.fallback,
            })
            .collect();

        // Strictly greater keeps the earliest registered detector on ties
        let best = candidates
            .into_iter()
            .reduce(|best, c| if c.score > best.score { c } else { best });

        match best {
            Some(best) => {
                info!(
                    "Selected '{}' clustering: {} clusters (score {:.4})",
                    best.name,
                    best.clusters.len(),
                    best.score
                );
                ClusteringOutcome {
                    summary: ClusteringSummary {
                        algorithm: best.name.to_string(),
                        score: best.score,
                        candidates: summaries,
                    },
                    partition: best.partition,
                    clusters: best.clusters,
                }
            }
            None => {
                // Empty registry: the hierarchical result stands alone
                let partition = fallback_partition();
                let clusters = cluster_metrics(ctx, &partition);
                let score = self.score(&clusters);
                ClusteringOutcome {
                    summary: ClusteringSummary {
                        algorithm: HierarchicalDetector.name().to_string(),
                        score,
                        candidates: vec![],
                    },
                    partition,
                    clusters,
                }
            }
        }
    }

    /// Cluster-averaged selection composite
    pub fn score(&self, clusters: &[ClusterResult]) -> f64 {
        if clusters.is_empty() {
            return 0.0;
        }
        let w = self.weights;
        let total: f64 = clusters
            .iter()
            .map(|c| {
                w.modularity * c.modularity
                    + w.silhouette * c.silhouette_score
                    + w.cohesion * c.cohesion
                    + w.coupling * (1.0 - c.coupling)
            })
            .sum();
        total / clusters.len() as f64
    }
}

/// Relabel communities 0, 1, 2, ... in first-seen node order
pub fn renumber(partition: Partition) -> Partition {
    let mut mapping: FxHashMap<usize, usize> = FxHashMap::default();
    partition
        .into_iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(label).or_insert(next)
        })
        .collect()
}

/// A partition must label every node exactly once
pub fn validate_partition(partition: Partition, n: usize) -> Result<Partition, AlgorithmFailure> {
    if partition.len() != n {
        return Err(AlgorithmFailure::InvalidPartition {
            assigned: partition.len(),
            expected: n,
        });
    }
    Ok(partition)
}

/// Shared state for modularity-driven local moves on the undirected graph
pub(crate) struct ModularityState<'c> {
    neighbors: &'c [Vec<usize>],
    degrees: Vec<f64>,
    /// Σtot: summed degree per community label
    sigma_tot: Vec<f64>,
    labels: Vec<usize>,
    m: f64,
}

impl<'c> ModularityState<'c> {
    pub(crate) fn singletons(ctx: &'c ClusteringContext) -> Self {
        let degrees: Vec<f64> = ctx.neighbors.iter().map(|n| n.len() as f64).collect();
        Self {
            neighbors: &ctx.neighbors,
            sigma_tot: degrees.clone(),
            degrees,
            labels: (0..ctx.len()).collect(),
            m: ctx.undirected_edges() as f64,
        }
    }

    pub(crate) fn has_edges(&self) -> bool {
        self.m > 0.0
    }

    pub(crate) fn into_labels(self) -> Partition {
        self.labels
    }

    /// Links from `node` into each neighbouring community, first-seen order
    pub(crate) fn neighbor_links(&self, node: usize) -> Vec<(usize, f64)> {
        let mut links: Vec<(usize, f64)> = Vec::new();
        for &nb in &self.neighbors[node] {
            let c = self.labels[nb];
            match links.iter_mut().find(|(label, _)| *label == c) {
                Some((_, k)) => *k += 1.0,
                None => links.push((c, 1.0)),
            }
        }
        links
    }

    /// ΔQ of inserting the isolated `node` into a community with `sigma_tot`
    /// total degree and `k_in` links from the node:
    /// k_in/m - ((Σtot + k)/2m)² + (Σtot/2m)² + (k/2m)²
    pub(crate) fn gain(&self, node: usize, k_in: f64, sigma_tot: f64) -> f64 {
        if self.m == 0.0 {
            return 0.0;
        }
        let k = self.degrees[node];
        let two_m = 2.0 * self.m;
        k_in / self.m - ((sigma_tot + k) / two_m).powi(2)
            + (sigma_tot / two_m).powi(2)
            + (k / two_m).powi(2)
    }

    /// Σtot of `community` with `node` taken out
    pub(crate) fn sigma_without(&self, node: usize, community: usize) -> f64 {
        let mut sigma = self.sigma_tot[community];
        if self.labels[node] == community {
            sigma -= self.degrees[node];
        }
        sigma
    }

    /// Best strictly improving move for `node` as (community, improvement)
    pub(crate) fn best_move(&self, node: usize) -> Option<(usize, f64)> {
        let current = self.labels[node];
        let links = self.neighbor_links(node);
        let k_in_current = links
            .iter()
            .find(|(c, _)| *c == current)
            .map(|(_, k)| *k)
            .unwrap_or(0.0);
        let stay = self.gain(node, k_in_current, self.sigma_without(node, current));

        let mut best: Option<(usize, f64)> = None;
        for (community, k_in) in links {
            if community == current {
                continue;
            }
            let gain = self.gain(node, k_in, self.sigma_without(node, community));
            if gain <= 0.0 {
                continue;
            }
            let improvement = gain - stay;
            if improvement > MIN_IMPROVEMENT && best.map_or(true, |(_, b)| improvement > b) {
                best = Some((community, improvement));
            }
        }
        best
    }

    pub(crate) fn apply_move(&mut self, node: usize, community: usize) {
        let current = self.labels[node];
        self.sigma_tot[current] -= self.degrees[node];
        self.sigma_tot[community] += self.degrees[node];
        self.labels[node] = community;
    }
}

/// Improvements at or below this are treated as ties
pub(crate) const MIN_IMPROVEMENT: f64 = 1e-12;


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    struct Failing;

    impl CommunityDetector for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn detect(&self, _ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure> {
            Err(AlgorithmFailure::Degenerate("always".into()))
        }
    }

    struct Truncated;

    impl CommunityDetector for Truncated {
        fn name(&self) -> &'static str {
            "truncated"
        }
        fn detect(&self, _ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure> {
            Ok(vec![0])
        }
    }

    #[test]
    fn test_renumber_first_seen() {
        assert_eq!(renumber(vec![7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
    }

    #[test]
    fn test_validate_partition() {
        assert!(validate_partition(vec![0, 1], 2).is_ok());
        assert_eq!(
            validate_partition(vec![0], 3).unwrap_err(),
            AlgorithmFailure::InvalidPartition { assigned: 1, expected: 3 }
        );
    }

    #[test]
    fn test_registry_from_config() {
        let registry = DetectorRegistry::from_config(&ClusteringConfig::default()).unwrap();
        assert_eq!(registry.names(), vec!["louvain", "spectral", "greedy-modularity"]);

        let config = ClusteringConfig {
            algorithms: vec!["kmeans".into()],
            ..Default::default()
        };
        assert!(matches!(
            DetectorRegistry::from_config(&config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_failures_use_fallback() {
        let m = two_triangles();
        let ctx = context(&m);
        let mut registry = DetectorRegistry::new();
        registry.register(Box::new(Failing));
        registry.register(Box::new(Truncated));
        let weights = SelectionWeights::default();

        let outcome = ClusteringEngine::new(&registry, &weights).run(&ctx);
        assert_eq!(outcome.partition.len(), 6);
        assert!(outcome.summary.candidates.iter().all(|c| c.fallback));
        // Equal scores: first registered wins
        assert_eq!(outcome.summary.algorithm, "failing");
    }

    #[test]
    fn test_default_registry_partitions_every_node() {
        let m = two_triangles();
        let ctx = context(&m);
        let registry = DetectorRegistry::from_config(&ClusteringConfig::default()).unwrap();
        let weights = SelectionWeights::default();

        let outcome = ClusteringEngine::new(&registry, &weights).run(&ctx);
        let covered: usize = outcome.clusters.iter().map(|c| c.members.len()).sum();
        assert_eq!(covered, 6);
        assert_eq!(outcome.summary.candidates.len(), 3);
        assert!(same_community(&outcome.partition, &[0, 1, 2]));
        assert!(same_community(&outcome.partition, &[3, 4, 5]));
    }

    #[test]
    fn test_spectral_iteration_cap_from_config() {
        let m = two_triangles();
        let ctx = context(&m);
        let config = ClusteringConfig {
            algorithms: vec!["spectral".into()],
            spectral_tolerance: 0.0,
            spectral_max_iterations: 1,
            ..Default::default()
        };
        let registry = DetectorRegistry::from_config(&config).unwrap();
        let weights = SelectionWeights::default();

        let outcome = ClusteringEngine::new(&registry, &weights).run(&ctx);
        assert_eq!(outcome.summary.candidates.len(), 1);
        assert!(outcome.summary.candidates[0].fallback);
        assert_eq!(outcome.partition.len(), 6);
    }

    #[test]
    fn test_empty_registry_uses_hierarchical() {
        let m = matrix(4, &[(0, 1)]);
        let ctx = context(&m);
        let registry = DetectorRegistry::new();
        let weights = SelectionWeights::default();
        let outcome = ClusteringEngine::new(&registry, &weights).run(&ctx);
        assert_eq!(outcome.summary.algorithm, "hierarchical");
        assert_eq!(outcome.partition.len(), 4);
    }

    #[test]
    fn test_normalize_features_constant_column() {
        let rows = normalize_features(vec![[1.0, 5.0, 0.0, 0.0, 0.0], [3.0, 5.0, 0.0, 0.0, 0.0]]);
        assert_eq!(rows[0][0], 0.0);
        assert_eq!(rows[1][0], 1.0);
        assert_eq!(rows[0][1], 0.0);
    }
}
