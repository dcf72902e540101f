//! Greedy global modularity optimization
//!
//! Unlike the Louvain sweep, which moves nodes one after another, this
//! detector scans the whole graph for the single move with the largest
//! improvement, applies it, and repeats until no improving move remains.

use tracing::debug;

use super::{ClusteringContext, CommunityDetector, ModularityState, Partition};
use crate::error::AlgorithmFailure;

pub struct GreedyModularityDetector {
    max_moves: usize,
}

impl GreedyModularityDetector {
    pub fn new(max_moves: usize) -> Self {
        Self { max_moves }
    }
}

impl CommunityDetector for GreedyModularityDetector {
    fn name(&self) -> &'static str {
        "greedy-modularity"
    }

    fn detect(&self, ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure> {
        let mut state = ModularityState::singletons(ctx);
        if !state.has_edges() {
            return Ok(state.into_labels());
        }

        let mut moves = 0;
        while moves < self.max_moves {
            // Ties keep the lowest node index
            let best = (0..ctx.len())
                .filter_map(|node| state.best_move(node).map(|(c, gain)| (node, c, gain)))
                .fold(None, |best: Option<(usize, usize, f64)>, candidate| match best {
                    Some(b) if b.2 >= candidate.2 => Some(b),
                    _ => Some(candidate),
                });

            let Some((node, community, _)) = best else {
                break;
            };
            state.apply_move(node, community);
            moves += 1;
        }

        if moves == self.max_moves {
            debug!("Greedy modularity stopped at the move cap ({})", moves);
        }
        Ok(state.into_labels())
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
        let p = renumber(GreedyModularityDetector::new(10_000).detect(&ctx).unwrap());
        assert!(same_community(&p, &[0, 1, 2]));
        assert!(same_community(&p, &[3, 4, 5]));
        assert_ne!(p[0], p[3]);
    }

    #[test]
    fn test_move_cap_zero_keeps_singletons() {
        let m = two_triangles();
        let ctx = context(&m);
        let p = GreedyModularityDetector::new(0).detect(&ctx).unwrap();
        assert_eq!(p, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_no_edges() {
        let m = matrix(2, &[]);
        let ctx = context(&m);
        assert_eq!(GreedyModularityDetector::new(10).detect(&ctx).unwrap(), vec![0, 1]);
    }
}
