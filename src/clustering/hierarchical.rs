//! Agglomerative clustering on complexity features
//!
//! Starts from singletons and repeatedly merges the two clusters whose
//! centroids are most similar, similarity being 1 / (1 + euclidean distance)
//! over the normalized complexity features. Stops at round(√N) clusters.
//! Ignores edges entirely, so it works on any graph and serves as the
//! fallback when another detector fails.

use super::{euclidean, ClusteringContext, CommunityDetector, Partition, FEATURE_COUNT};
use crate::error::AlgorithmFailure;

pub struct HierarchicalDetector;

struct Group {
    members: Vec<usize>,
    centroid: [f64; FEATURE_COUNT],
}

impl HierarchicalDetector {
    /// Number of clusters to stop at
    pub fn target_clusters(n: usize) -> usize {
        ((n as f64).sqrt().round() as usize).max(1)
    }
}

fn similarity(a: &Group, b: &Group) -> f64 {
    1.0 / (1.0 + euclidean(&a.centroid, &b.centroid))
}

/// Most similar live group to `i`, lowest index on ties
fn nearest(groups: &[Option<Group>], i: usize) -> Option<(usize, f64)> {
    let gi = groups[i].as_ref()?;
    let mut best: Option<(usize, f64)> = None;
    for (j, gj) in groups.iter().enumerate() {
        if i == j {
            continue;
        }
        if let Some(gj) = gj {
            let s = similarity(gi, gj);
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((j, s));
            }
        }
    }
    best
}

impl CommunityDetector for HierarchicalDetector {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn detect(&self, ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure> {
        let n = ctx.len();
        if n == 0 {
            return Err(AlgorithmFailure::Degenerate("no nodes to cluster".into()));
        }

        let mut groups: Vec<Option<Group>> = ctx
            .features
            .iter()
            .enumerate()
            .map(|(i, f)| {
                Some(Group {
                    members: vec![i],
                    centroid: *f,
                })
            })
            .collect();

        // Nearest-neighbour cache, refreshed only for groups touched by a merge
        let mut cache: Vec<Option<(usize, f64)>> = (0..n).map(|i| nearest(&groups, i)).collect();

        let target = Self::target_clusters(n);
        let mut live = n;
        while live > target {
            let mut pick: Option<(usize, usize, f64)> = None;
            for (i, entry) in cache.iter().enumerate() {
                if let Some((j, s)) = *entry {
                    if pick.map_or(true, |(_, _, b)| s > b) {
                        pick = Some((i, j, s));
                    }
                }
            }
            let Some((a, b, _)) = pick else {
                break;
            };
            let (keep, gone) = (a.min(b), a.max(b));

            let Some(absorbed) = groups[gone].take() else {
                break;
            };
            if let Some(target_group) = groups[keep].as_mut() {
                let (na, nb) = (target_group.members.len() as f64, absorbed.members.len() as f64);
                for k in 0..FEATURE_COUNT {
                    target_group.centroid[k] =
                        (target_group.centroid[k] * na + absorbed.centroid[k] * nb) / (na + nb);
                }
                target_group.members.extend(absorbed.members);
            }
            cache[gone] = None;
            live -= 1;

            for i in 0..n {
                let stale = match cache[i] {
                    Some((j, _)) => i == keep || j == keep || j == gone,
                    None => false,
                };
                if stale {
                    cache[i] = nearest(&groups, i);
                } else if let (Some(gi), Some(gk)) = (groups[i].as_ref(), groups[keep].as_ref()) {
                    if i != keep {
                        let s = similarity(gi, gk);
                        if cache[i].map_or(true, |(j, b)| s > b || (s == b && keep < j)) {
                            cache[i] = Some((keep, s));
                        }
                    }
                }
            }
        }

        let mut partition = vec![0; n];
        for (label, group) in groups.iter().enumerate() {
            if let Some(group) = group {
                for &m in &group.members {
                    partition[m] = label;
                }
            }
        }
        Ok(partition)
    }
}
