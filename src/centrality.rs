//! Centrality measures over the dependency graph
//!
//! | Measure      | Question it answers                                    |
//! |--------------|--------------------------------------------------------|
//! | Eigenvector  | Is this file linked to other well-linked files?        |
//! | Betweenness  | How many shortest paths run through this file?         |
//! | Closeness    | How few hops does this file need to reach the rest?    |
//! | PageRank     | How much "import traffic" ends up at this file?        |
//!
//! All four read the same immutable matrix and path table and run
//! concurrently. Edge-free graphs score zero on every measure.

use nalgebra::SymmetricEigen;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::CentralityConfig;
use crate::error::AlgorithmFailure;
use crate::graph::{AdjacencyMatrix, ShortestPaths};
use crate::models::Centrality;

/// Per-node scores, indexed by matrix order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralityScores {
    pub betweenness: Vec<f64>,
    pub closeness: Vec<f64>,
    pub eigenvector: Vec<f64>,
    pub pagerank: Vec<f64>,
}

impl CentralityScores {
    pub fn node(&self, i: usize) -> Centrality {
        Centrality {
            betweenness: self.betweenness[i],
            closeness: self.closeness[i],
            eigenvector: self.eigenvector[i],
            pagerank: self.pagerank[i],
        }
    }
}

pub struct CentralityEngine<'a> {
    config: &'a CentralityConfig,
}

impl<'a> CentralityEngine<'a> {
    pub fn new(config: &'a CentralityConfig) -> Self {
        Self { config }
    }

    /// Run all four measures; a failed eigendecomposition yields zeros
    pub fn compute(&self, matrix: &AdjacencyMatrix, paths: &ShortestPaths) -> CentralityScores {
        let n = matrix.dim();

        let ((eigenvector, pagerank), (betweenness, closeness)) = rayon::join(
            || {
                rayon::join(
                    || {
                        self.eigenvector(matrix).unwrap_or_else(|e| {
                            warn!("Eigenvector centrality failed, using zeros: {}", e);
                            vec![0.0; n]
                        })
                    },
                    || self.pagerank(matrix),
                )
            },
            || rayon::join(|| betweenness(paths), || closeness(paths)),
        );

        debug!("Computed centrality for {} nodes", n);
        CentralityScores {
            betweenness,
            closeness,
            eigenvector,
            pagerank,
        }
    }

    /// Principal eigenvector of the symmetrized adjacency (A + Aᵀ) / 2
    pub fn eigenvector(&self, matrix: &AdjacencyMatrix) -> Result<Vec<f64>, AlgorithmFailure> {
        let n = matrix.dim();
        if n == 0 || matrix.edge_count() == 0 {
            return Ok(vec![0.0; n]);
        }

        let a = matrix.to_dmatrix();
        let symmetric = (&a + a.transpose()) * 0.5;
        let eigen = SymmetricEigen::try_new(
            symmetric,
            self.config.eigen_tolerance,
            self.config.eigen_max_iterations,
        )
        .ok_or(AlgorithmFailure::NoConvergence)?;

        let principal = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &value)| {
                if value > best.1 {
                    (i, value)
                } else {
                    best
                }
            })
            .0;

        let mut vector: Vec<f64> = eigen.eigenvectors.column(principal).iter().copied().collect();
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(AlgorithmFailure::Degenerate("non-finite eigenvector".into()));
        }

        // The solver may return either sign; orient the dominant component positive
        let dominant = vector
            .iter()
            .copied()
            .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
        if dominant < 0.0 {
            vector.iter_mut().for_each(|v| *v = -*v);
        }

        let min = vector.iter().copied().fold(f64::INFINITY, f64::min);
        Ok(vector.into_iter().map(|v| (v - min).abs()).collect())
    }

    /// Power-iteration PageRank.
    ///
    /// Nodes without outgoing edges do not redistribute their score, so the
    /// total drifts below 1 during iteration; the result is rescaled to sum
    /// to 1 at the end. On graphs with dangling nodes every score therefore
    /// differs from the unnormalized dangling-drop values by the factor
    /// 1 / total; the ranking is unchanged.
    pub fn pagerank(&self, matrix: &AdjacencyMatrix) -> Vec<f64> {
        let n = matrix.dim();
        if n == 0 || matrix.edge_count() == 0 {
            return vec![0.0; n];
        }

        let damping = self.config.damping;
        let mut incoming: Vec<Vec<usize>> = vec![vec![]; n];
        let mut out_degree: Vec<usize> = vec![0; n];
        for (src, dst) in matrix.edges() {
            incoming[dst].push(src);
            out_degree[src] += 1;
        }

        let mut scores = vec![1.0 / n as f64; n];
        let base_score = (1.0 - damping) / n as f64;

        for iteration in 0..self.config.max_iterations {
            let new_scores: Vec<f64> = (0..n)
                .into_par_iter()
                .map(|node| {
                    let mut score = base_score;
                    for &neighbor in &incoming[node] {
                        score += damping * scores[neighbor] / out_degree[neighbor] as f64;
                    }
                    score
                })
                .collect();

            let diff: f64 = scores
                .par_iter()
                .zip(new_scores.par_iter())
                .map(|(old, new)| (old - new).abs())
                .sum();

            scores = new_scores;

            if diff < self.config.tolerance {
                debug!("PageRank converged after {} iterations", iteration + 1);
                break;
            }
        }

        let total: f64 = scores.iter().sum();
        if total > 0.0 {
            scores.iter_mut().for_each(|s| *s /= total);
        }
        scores
    }
}

/// Shortest-path betweenness, normalized by (N-1)(N-2)/2.
///
/// Each reachable ordered pair contributes along the single reconstructed
/// path, so ties between equally short paths are not split.
pub fn betweenness(paths: &ShortestPaths) -> Vec<f64> {
    let n = paths.len();
    if n <= 2 {
        return vec![0.0; n];
    }

    let counts = (0..n)
        .into_par_iter()
        .map(|source| {
            let mut local = vec![0.0; n];
            for target in 0..n {
                if source == target {
                    continue;
                }
                if let Some(path) = paths.path(source, target) {
                    for &interior in path.iter().skip(1).take(path.len().saturating_sub(2)) {
                        local[interior] += 1.0;
                    }
                }
            }
            local
        })
        .reduce(
            || vec![0.0; n],
            |mut acc, local| {
                acc.iter_mut().zip(local).for_each(|(a, l)| *a += l);
                acc
            },
        );

    let norm = ((n - 1) * (n - 2)) as f64 / 2.0;
    counts.into_iter().map(|c| c / norm).collect()
}

/// Reachable count over the summed distance to the reachable nodes
pub fn closeness(paths: &ShortestPaths) -> Vec<f64> {
    let n = paths.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let (reachable, total) = (0..n)
                .filter(|&j| j != i)
                .filter_map(|j| paths.distance(i, j))
                .fold((0usize, 0u64), |(r, t), d| (r + 1, t + d as u64));
            if total == 0 {
                0.0
            } else {
                reachable as f64 / total as f64
            }
        })
        .collect()
}
