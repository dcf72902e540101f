//! Spectral bipartition
//!
//! Splits the undirected graph in two by the sign of the Fiedler vector,
//! the eigenvector of the Laplacian L = D - A belonging to the second
//! smallest eigenvalue. Always yields exactly two communities or fails.

use nalgebra::{DMatrix, SymmetricEigen};

use super::{ClusteringContext, CommunityDetector, Partition};
use crate::error::AlgorithmFailure;

pub struct SpectralDetector {
    tolerance: f64,
    max_iterations: usize,
}

impl SpectralDetector {
    /// `max_iterations` of 0 lets the eigensolver run until convergence
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

impl Default for SpectralDetector {
    fn default() -> Self {
        Self::new(1e-9, 10_000)
    }
}

impl CommunityDetector for SpectralDetector {
    fn name(&self) -> &'static str {
        "spectral"
    }

    fn detect(&self, ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure> {
        let n = ctx.len();
        if n < 2 {
            return Err(AlgorithmFailure::Degenerate(format!(
                "spectral bipartition needs at least 2 nodes, got {}",
                n
            )));
        }

        let mut laplacian = DMatrix::<f64>::zeros(n, n);
        for (i, neighbors) in ctx.neighbors.iter().enumerate() {
            laplacian[(i, i)] = neighbors.len() as f64;
            for &j in neighbors {
                laplacian[(i, j)] = -1.0;
            }
        }

        let eigen = SymmetricEigen::try_new(laplacian, self.tolerance, self.max_iterations)
            .ok_or(AlgorithmFailure::NoConvergence)?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        let fiedler = eigen.eigenvectors.column(order[1]);

        if fiedler.iter().any(|v| !v.is_finite()) {
            return Err(AlgorithmFailure::Degenerate("non-finite Fiedler vector".into()));
        }

        let partition: Partition = fiedler
            .iter()
            .map(|&v| if v >= 0.0 { 0 } else { 1 })
            .collect();

        let negatives = partition.iter().filter(|&&c| c == 1).count();
        if negatives == 0 || negatives == n {
            return Err(AlgorithmFailure::Degenerate(
                "Fiedler vector does not split the graph".into(),
            ));
        }

        Ok(partition)
    }
}

#[cfg(test)]
mod tests {
    use super::super::renumber;
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_two_triangles_split() {
        let m = two_triangles();
        let ctx = context(&m);
        let p = renumber(SpectralDetector::default().detect(&ctx).unwrap());
        assert_eq!(p, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_always_two_communities() {
        let edges: Vec<_> = (0..7).map(|i| (i, i + 1)).collect();
        let m = matrix(8, &edges);
        let ctx = context(&m);
        let p = renumber(SpectralDetector::default().detect(&ctx).unwrap());
        assert_eq!(p.iter().max(), Some(&1));
    }

    #[test]
    fn test_iteration_cap_reports_no_convergence() {
        let m = two_triangles();
        let ctx = context(&m);
        assert_eq!(
            SpectralDetector::new(0.0, 1).detect(&ctx),
            Err(AlgorithmFailure::NoConvergence)
        );
    }

    #[test]
    fn test_single_node_is_degenerate() {
        let m = matrix(1, &[]);
        let ctx = context(&m);
        assert!(matches!(
            SpectralDetector::default().detect(&ctx),
            Err(AlgorithmFailure::Degenerate(_))
        ));
    }
}
