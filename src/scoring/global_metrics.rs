//! Whole-graph statistics
//!
//! Complexity aggregates over node weights plus classic network-science
//! descriptors: density, average path length, clustering coefficient,
//! small-world ratio and a power-law degree exponent estimate.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

use crate::graph::{AdjacencyMatrix, ShortestPaths};
use crate::models::{ClusterResult, GlobalMetrics, GraphNode};

pub fn compute_global_metrics(
    nodes: &IndexMap<String, GraphNode>,
    matrix: &AdjacencyMatrix,
    paths: &ShortestPaths,
    clusters: &[ClusterResult],
    cycle_count: usize,
) -> GlobalMetrics {
    let n = matrix.dim();
    let edges = matrix.edge_count();

    let weights: Vec<f64> = nodes.values().map(|node| node.weight).collect();
    let total_complexity: f64 = weights.iter().sum();
    let (average_complexity, complexity_variance) = if weights.is_empty() {
        (0.0, 0.0)
    } else {
        let mean = total_complexity / weights.len() as f64;
        let variance =
            weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / weights.len() as f64;
        (mean, variance)
    };

    let network_density = if n > 1 {
        edges as f64 / (n * (n - 1)) as f64
    } else {
        0.0
    };

    let average_path_length = average_path_length(paths);
    let clustering_coefficient = clustering_coefficient(matrix);
    let small_world_coefficient = if average_path_length > 0.0 {
        clustering_coefficient / average_path_length
    } else {
        0.0
    };

    let modularity_score = clusters
        .iter()
        .map(|c| c.modularity)
        .sum::<f64>()
        .clamp(-1.0, 1.0);

    GlobalMetrics {
        node_count: n,
        edge_count: edges,
        total_complexity,
        average_complexity,
        complexity_variance,
        modularity_score,
        network_density,
        average_path_length,
        clustering_coefficient,
        small_world_coefficient,
        scale_free_beta: scale_free_beta(matrix),
        cycle_count,
    }
}

/// Mean finite distance over ordered pairs i != j; 0 when no pair is connected
pub fn average_path_length(paths: &ShortestPaths) -> f64 {
    let (count, total) = paths
        .finite_pairs()
        .fold((0usize, 0u64), |(c, t), (_, _, d)| (c + 1, t + d as u64));
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Mean local clustering over nodes with undirected degree >= 2
pub fn clustering_coefficient(matrix: &AdjacencyMatrix) -> f64 {
    let neighbors = matrix.undirected_neighbors();
    let sets: Vec<FxHashSet<usize>> = neighbors
        .iter()
        .map(|list| list.iter().copied().collect())
        .collect();

    let local: Vec<f64> = neighbors
        .iter()
        .filter(|list| list.len() >= 2)
        .map(|list| {
            let k = list.len();
            let mut triangles = 0usize;
            for (a, &u) in list.iter().enumerate() {
                for &v in &list[a + 1..] {
                    if sets[u].contains(&v) {
                        triangles += 1;
                    }
                }
            }
            triangles as f64 / (k * (k - 1) / 2) as f64
        })
        .collect();

    if local.is_empty() {
        0.0
    } else {
        local.iter().sum::<f64>() / local.len() as f64
    }
}

/// |slope| of ln(frequency) against ln(degree) over the non-zero total
/// degree buckets; 0 with fewer than three buckets
pub fn scale_free_beta(matrix: &AdjacencyMatrix) -> f64 {
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for i in 0..matrix.dim() {
        let degree = matrix.in_degree(i) + matrix.out_degree(i);
        if degree > 0 {
            *histogram.entry(degree).or_insert(0) += 1;
        }
    }
    if histogram.len() < 3 {
        return 0.0;
    }

    let points: Vec<(f64, f64)> = histogram
        .iter()
        .map(|(&degree, &freq)| ((degree as f64).ln(), (freq as f64).ln()))
        .collect();
    let count = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / count;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / count;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();

    if sxx > 0.0 {
        (sxy / sxx).abs()
    } else {
        0.0
    }
}
