//! Louvain-style local moving
//!
//! Every node starts in its own community. Each sweep visits the nodes in
//! order and moves a node into the neighbouring community with the largest
//! positive modularity gain, if that beats staying put. Sweeps repeat until
//! one makes no move or the sweep cap is hit. Only the first Louvain phase
//! runs; communities are not aggregated into super-nodes.

use tracing::debug;

use super::{ClusteringContext, CommunityDetector, ModularityState, Partition};
use crate::error::AlgorithmFailure;

pub struct LouvainDetector {
    max_iterations: usize,
}

impl LouvainDetector {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl CommunityDetector for LouvainDetector {
    fn name(&self) -> &'static str {
        "louvain"
    }

    fn detect(&self, ctx: &ClusteringContext) -> Result<Partition, AlgorithmFailure> {
        let mut state = ModularityState::singletons(ctx);
        if !state.has_edges() {
            return Ok(state.into_labels());
        }

        let mut sweeps = 0;
        let mut improved = true;
        while improved && sweeps < self.max_iterations {
            improved = false;
            sweeps += 1;

            for node in 0..ctx.len() {
                if let Some((community, _)) = state.best_move(node) {
                    state.apply_move(node, community);
                    improved = true;
                }
            }
        }

        debug!("Louvain finished after {} sweeps", sweeps);
        Ok(state.into_labels())
    }
}
