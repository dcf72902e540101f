//! Circular dependency detection
//!
//! A circular dependency group is a strongly connected component with at
//! least two files: every file in the group can reach every other one by
//! following imports. Tarjan's algorithm finds them all in O(N + E).

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use super::AdjacencyMatrix;

/// Strongly connected components of size >= `min_size`.
///
/// Members are sorted by node index and groups by their first member, so
/// the result does not depend on petgraph's traversal order.
pub fn find_cycles(matrix: &AdjacencyMatrix, min_size: usize) -> Vec<Vec<usize>> {
    let n = matrix.dim();
    if n == 0 {
        return vec![];
    }

    // Node weights are unused; only structure matters
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(n, matrix.edge_count());
    let indices: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
    for (i, j) in matrix.edges() {
        graph.add_edge(indices[i], indices[j], ());
    }

    let mut groups: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() >= min_size)
        .map(|scc| {
            let mut members: Vec<usize> = scc.into_iter().map(|idx| idx.index()).collect();
            members.sort_unstable();
            members
        })
        .collect();
    groups.sort_by_key(|g| g[0]);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n: usize, edges: &[(usize, usize)]) -> AdjacencyMatrix {
        AdjacencyMatrix::from_edges((0..n).map(|i| format!("n{}", i)).collect(), edges)
    }

    #[test]
    fn test_no_cycles_in_dag() {
        let m = matrix(4, &[(0, 1), (1, 2), (0, 3)]);
        assert!(find_cycles(&m, 2).is_empty());
    }

    #[test]
    fn test_two_separate_cycles() {
        let m = matrix(6, &[(4, 5), (5, 4), (0, 1), (1, 2), (2, 0), (2, 3)]);
        assert_eq!(find_cycles(&m, 2), vec![vec![0, 1, 2], vec![4, 5]]);
    }

    #[test]
    fn test_min_size_one_returns_every_node() {
        let m = matrix(3, &[(0, 1)]);
        assert_eq!(find_cycles(&m, 1).len(), 3);
    }

    #[test]
    fn test_empty() {
        assert!(find_cycles(&matrix(0, &[]), 2).is_empty());
    }
}
