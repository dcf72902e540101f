//! All-pairs shortest paths (Floyd-Warshall, unit edge weights)
//!
//! Computed once per analysis and shared by betweenness, closeness and the
//! global path metrics. Each pair keeps a single next hop, so path
//! reconstruction follows one shortest path even when several exist.

use rayon::prelude::*;

use super::AdjacencyMatrix;

const INF: u32 = u32::MAX;

pub struct ShortestPaths {
    n: usize,
    /// Row-major distances, `INF` when unreachable
    dist: Vec<u32>,
    /// Row-major next hop from i towards j
    next: Vec<Option<usize>>,
}

impl ShortestPaths {
    pub fn compute(matrix: &AdjacencyMatrix) -> Self {
        let n = matrix.dim();
        let mut dist = vec![INF; n * n];
        let mut next = vec![None; n * n];

        for i in 0..n {
            dist[i * n + i] = 0;
            next[i * n + i] = Some(i);
        }
        for (i, j) in matrix.edges() {
            dist[i * n + j] = 1;
            next[i * n + j] = Some(j);
        }

        for k in 0..n {
            let row_k: Vec<u32> = dist[k * n..(k + 1) * n].to_vec();

            dist.par_chunks_mut(n.max(1))
                .zip(next.par_chunks_mut(n.max(1)))
                .for_each(|(d_row, n_row)| {
                    let d_ik = d_row[k];
                    if d_ik == INF {
                        return;
                    }
                    let hop = n_row[k];
                    for j in 0..n {
                        let d_kj = row_k[j];
                        if d_kj == INF {
                            continue;
                        }
                        let candidate = d_ik + d_kj;
                        if candidate < d_row[j] {
                            d_row[j] = candidate;
                            n_row[j] = hop;
                        }
                    }
                });
        }

        Self { n, dist, next }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Hop count from i to j, None when unreachable
    pub fn distance(&self, i: usize, j: usize) -> Option<u32> {
        match self.dist[i * self.n + j] {
            INF => None,
            d => Some(d),
        }
    }

    /// Node sequence from i to j inclusive, following the stored next hops
    pub fn path(&self, i: usize, j: usize) -> Option<Vec<usize>> {
        self.distance(i, j)?;

        let mut path = vec![i];
        let mut current = i;
        while current != j {
            current = self.next[current * self.n + j]?;
            path.push(current);
            if path.len() > self.n {
                return None;
            }
        }
        Some(path)
    }

    /// All (i, j, distance) with i != j and j reachable from i
    pub fn finite_pairs(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        let n = self.n;
        self.dist
            .iter()
            .enumerate()
            .filter_map(move |(idx, &d)| {
                let (i, j) = (idx / n, idx % n);
                (i != j && d != INF).then_some((i, j, d))
            })
    }
}
