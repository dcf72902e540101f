//! Per-cluster quality metrics
//!
//! Edge counts are directed: `internal` edges have both ends inside the
//! cluster, `cut` edges exactly one. `volume` is the summed in + out degree
//! of the members. Every ratio with a zero denominator is 0.

use rayon::prelude::*;

use super::{ClusteringContext, Partition};
use crate::models::ClusterResult;

/// Metrics for every community of `partition`, ordered by label
pub fn cluster_metrics(ctx: &ClusteringContext, partition: &Partition) -> Vec<ClusterResult> {
    let n = ctx.len();
    let community_count = partition.iter().max().map_or(0, |&m| m + 1);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); community_count];
    for (node, &label) in partition.iter().enumerate() {
        members[label].push(node);
    }

    let total_edges = ctx.matrix.edge_count() as f64;
    let silhouettes = node_silhouettes(ctx, partition);

    members
        .into_iter()
        .enumerate()
        .filter(|(_, m)| !m.is_empty())
        .map(|(label, nodes)| {
            let mut internal = 0usize;
            let mut cut = 0usize;
            let mut volume = 0usize;
            for &i in &nodes {
                volume += ctx.matrix.in_degree(i) + ctx.matrix.out_degree(i);
                for (j, &v) in ctx.matrix.rows()[i].iter().enumerate() {
                    if v == 0 {
                        continue;
                    }
                    if partition[j] == label {
                        internal += 1;
                    } else {
                        cut += 1;
                    }
                }
                // Incoming edges from outside
                for j in 0..n {
                    if partition[j] != label && ctx.matrix.has_edge(j, i) {
                        cut += 1;
                    }
                }
            }

            let size = nodes.len();
            let mut linked_pairs = 0usize;
            for (a, &i) in nodes.iter().enumerate() {
                for &j in &nodes[a + 1..] {
                    if ctx.matrix.has_edge(i, j) || ctx.matrix.has_edge(j, i) {
                        linked_pairs += 1;
                    }
                }
            }

            let pairs = size * size.saturating_sub(1);
            let cohesion = ratio(linked_pairs as f64, (pairs / 2) as f64);
            let coupling = ratio(cut as f64, (2 * internal + cut) as f64);
            let modularity = if total_edges > 0.0 {
                let expected = (volume as f64 / (2.0 * total_edges)).powi(2) * total_edges;
                ((internal as f64 - expected) / total_edges).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            let silhouette_score = if size > 1 {
                nodes.iter().map(|&i| silhouettes[i]).sum::<f64>() / size as f64
            } else {
                0.0
            };

            ClusterResult {
                id: label,
                members: nodes.iter().map(|&i| ctx.matrix.id(i).to_string()).collect(),
                cohesion,
                coupling,
                modularity,
                silhouette_score,
                internal_density: ratio(internal as f64, pairs as f64),
                external_density: ratio(cut as f64, (2 * size * (n - size)) as f64),
                conductance: ratio(cut as f64, volume as f64),
            }
        })
        .collect()
}

/// Silhouette per node: (b - a) / max(a, b) with `a` the mean distance to
/// cluster mates and `b` the distance to the closest node outside. Members
/// of singleton clusters score 0.
fn node_silhouettes(ctx: &ClusteringContext, partition: &Partition) -> Vec<f64> {
    let n = ctx.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let mut mates = 0usize;
            let mut mate_distance = 0.0;
            let mut nearest_outside: Option<f64> = None;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = ctx.distance(i, j);
                if partition[j] == partition[i] {
                    mates += 1;
                    mate_distance += d;
                } else {
                    nearest_outside = Some(nearest_outside.map_or(d, |b: f64| b.min(d)));
                }
            }
            if mates == 0 {
                return 0.0;
            }
            let a = mate_distance / mates as f64;
            let b = nearest_outside.unwrap_or(0.0);
            let denom = a.max(b);
            if denom > 0.0 {
                ((b - a) / denom).clamp(-1.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        (numerator / denominator).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::FEATURE_COUNT;
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_single_node_all_zero() {
        let m = matrix(1, &[]);
        let ctx = context(&m);
        let clusters = cluster_metrics(&ctx, &vec![0]);
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.cohesion, 0.0);
        assert_eq!(c.coupling, 0.0);
        assert_eq!(c.modularity, 0.0);
        assert_eq!(c.silhouette_score, 0.0);
    }

    #[test]
    fn test_mutual_pair_one_cluster() {
        let m = matrix(2, &[(0, 1), (1, 0)]);
        let ctx = context(&m);
        let clusters = cluster_metrics(&ctx, &vec![0, 0]);
        let c = &clusters[0];
        assert!(approx_eq(c.cohesion, 1.0));
        assert!(approx_eq(c.coupling, 0.0));
        assert!(approx_eq(c.modularity, 0.0));
        assert!(approx_eq(c.internal_density, 1.0));
        assert!(approx_eq(c.external_density, 0.0));
        assert_eq!(c.members, vec!["n0", "n1"]);
    }

    #[test]
    fn test_two_triangles_metrics() {
        let m = two_triangles();
        let ctx = context(&m);
        let clusters = cluster_metrics(&ctx, &vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(clusters.len(), 2);

        let left = &clusters[0];
        // 3 internal, 1 cut, volume 7 of 7 edges
        assert!(approx_eq(left.cohesion, 1.0));
        assert!(approx_eq(left.coupling, 1.0 / 7.0));
        assert!(approx_eq(left.conductance, 1.0 / 7.0));
        assert!(approx_eq(left.internal_density, 0.5));
        assert!(approx_eq(left.external_density, 1.0 / 18.0));
        assert!(approx_eq(left.modularity, (3.0 - 0.25 * 7.0) / 7.0));
    }

    #[test]
    fn test_modularity_bounds_on_singletons() {
        let m = two_triangles();
        let ctx = context(&m);
        let clusters = cluster_metrics(&ctx, &vec![0, 1, 2, 3, 4, 5]);
        for c in &clusters {
            assert!((-1.0..=1.0).contains(&c.modularity));
            assert_eq!(c.cohesion, 0.0);
            assert_eq!(c.silhouette_score, 0.0);
        }
    }

    #[test]
    fn test_silhouette_separated_features() {
        let m = matrix(4, &[]);
        let ctx = ClusteringContext::with_features(
            &m,
            vec![
                [0.0; FEATURE_COUNT],
                [0.1, 0.0, 0.0, 0.0, 0.0],
                [1.0; FEATURE_COUNT],
                [0.9, 1.0, 1.0, 1.0, 1.0],
            ],
        );
        let clusters = cluster_metrics(&ctx, &vec![0, 0, 1, 1]);
        for c in &clusters {
            assert!(c.silhouette_score > 0.8);
        }
        let swapped = cluster_metrics(&ctx, &vec![0, 1, 0, 1]);
        for c in &swapped {
            assert!(c.silhouette_score < 0.0);
        }
    }
}
