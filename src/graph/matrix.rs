//! Dense adjacency matrix over a fixed node ordering
//!
//! Row `i`, column `j` is 1 when node `i` depends on node `j`. The ordering
//! chosen here is reused by every downstream computation.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::GraphNode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    /// Node ids, index = row/column
    order: Vec<String>,
    rows: Vec<Vec<u8>>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl PartialEq for AdjacencyMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.rows == other.rows
    }
}

impl AdjacencyMatrix {
    /// Build from the node map in O(N + E)
    pub fn from_nodes(nodes: &IndexMap<String, GraphNode>) -> Self {
        let n = nodes.len();
        let mut rows = vec![vec![0u8; n]; n];

        for (i, node) in nodes.values().enumerate() {
            for dep in &node.dependencies {
                if let Some(j) = nodes.get_index_of(dep) {
                    if i != j {
                        rows[i][j] = 1;
                    }
                }
            }
        }

        Self::from_parts(nodes.keys().cloned().collect(), rows)
    }

    /// Build from an explicit edge list; out-of-range and self edges are ignored
    pub fn from_edges(order: Vec<String>, edges: &[(usize, usize)]) -> Self {
        let n = order.len();
        let mut rows = vec![vec![0u8; n]; n];
        for &(i, j) in edges {
            if i < n && j < n && i != j {
                rows[i][j] = 1;
            }
        }
        Self::from_parts(order, rows)
    }

    fn from_parts(order: Vec<String>, rows: Vec<Vec<u8>>) -> Self {
        let index = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self { order, rows, index }
    }

    pub fn dim(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn id(&self, i: usize) -> &str {
        &self.order[i]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        if self.index.is_empty() && !self.order.is_empty() {
            // Deserialized value: index is not serialized
            return self.order.iter().position(|o| o == id);
        }
        self.index.get(id).copied()
    }

    pub fn get(&self, i: usize, j: usize) -> u8 {
        self.rows[i][j]
    }

    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.rows[i][j] != 0
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Number of directed edges (the matrix sum)
    pub fn edge_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.iter().map(|&v| v as usize).sum::<usize>())
            .sum()
    }

    pub fn out_degree(&self, i: usize) -> usize {
        self.rows[i].iter().filter(|&&v| v != 0).count()
    }

    pub fn in_degree(&self, j: usize) -> usize {
        self.rows.iter().filter(|r| r[j] != 0).count()
    }

    /// Directed edge list in row-major order
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0 {
                    edges.push((i, j));
                }
            }
        }
        edges
    }

    /// Neighbour lists of the undirected view (A or Aᵀ), sorted
    pub fn undirected_neighbors(&self) -> Vec<Vec<usize>> {
        let n = self.dim();
        (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| i != j && (self.rows[i][j] != 0 || self.rows[j][i] != 0))
                    .collect()
            })
            .collect()
    }

    /// Number of undirected edges (pairs linked in either direction)
    pub fn undirected_edge_count(&self) -> usize {
        let n = self.dim();
        let mut count = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                if self.rows[i][j] != 0 || self.rows[j][i] != 0 {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        let n = self.dim();
        DMatrix::from_fn(n, n, |i, j| self.rows[i][j] as f64)
    }
}
