//! Graph construction from file facts
//!
//! Validates the corpus against the configured limits, computes per-file
//! complexity in parallel, resolves dependency identifiers to node ids and
//! derives fan-in / fan-out, coupling and the node weight.

use indexmap::IndexMap;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace, warn};

use super::complexity::file_metrics;
use super::resolver::DependencyResolver;
use crate::config::{EngineConfig, WeightConfig};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{ComplexityMetrics, FileFacts, GraphNode};

pub struct GraphBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Check corpus limits without doing any work
    pub fn validate(&self, files: &[FileFacts]) -> AnalysisResult<()> {
        let limits = &self.config.limits;
        if files.is_empty() {
            return Err(AnalysisError::EmptyCorpus);
        }
        if files.len() > limits.max_nodes {
            return Err(AnalysisError::CorpusTooLarge {
                count: files.len(),
                max: limits.max_nodes,
            });
        }
        if let Some(big) = files.iter().find(|f| f.size_bytes > limits.max_file_size) {
            return Err(AnalysisError::FileTooLarge {
                path: big.path.clone(),
                size: big.size_bytes,
                max: limits.max_file_size,
            });
        }
        Ok(())
    }

    /// Build the node map, keyed by path in first-seen order
    pub fn build(&self, files: &[FileFacts]) -> AnalysisResult<IndexMap<String, GraphNode>> {
        self.validate(files)?;

        let mut seen = FxHashSet::default();
        let unique: Vec<&FileFacts> = files
            .iter()
            .filter(|f| {
                let fresh = seen.insert(f.path.as_str());
                if !fresh {
                    warn!("Duplicate file {} ignored, keeping first occurrence", f.path);
                }
                fresh
            })
            .collect();

        let metrics: Vec<ComplexityMetrics> = unique.par_iter().map(|f| file_metrics(f)).collect();

        let mut nodes: IndexMap<String, GraphNode> = unique
            .iter()
            .zip(metrics)
            .map(|(f, m)| (f.path.clone(), GraphNode::new(f.path.clone(), m)))
            .collect();

        let edges = self.resolve_edges(&unique);
        for &(from, to) in &edges {
            let to_id = nodes.get_index(to).map(|(k, _)| k.clone());
            let from_id = nodes.get_index(from).map(|(k, _)| k.clone());
            if let (Some(from_id), Some(to_id)) = (from_id, to_id) {
                if let Some((_, node)) = nodes.get_index_mut(from) {
                    node.dependencies.insert(to_id);
                }
                if let Some((_, node)) = nodes.get_index_mut(to) {
                    node.dependents.insert(from_id);
                }
            }
        }

        let weights = &self.config.weights;
        for node in nodes.values_mut() {
            let c = &mut node.complexity;
            c.fan_in = node.dependents.len();
            c.fan_out = node.dependencies.len();
            c.coupling_between_objects = c.fan_in + c.fan_out;
            node.weight = node_weight(c, weights);
        }

        let edge_count: usize = nodes.values().map(|n| n.dependencies.len()).sum();
        info!("Built dependency graph: {} nodes, {} edges", nodes.len(), edge_count);

        Ok(nodes)
    }

    /// Resolve every declared dependency once the full id list exists
    fn resolve_edges(&self, files: &[&FileFacts]) -> Vec<(usize, usize)> {
        let ids: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        let resolver = DependencyResolver::new(&ids, &self.config.resolution.extensions);

        let mut edges = Vec::new();
        let mut dropped = 0usize;
        for (i, file) in files.iter().enumerate() {
            for raw in &file.dependencies {
                match resolver.resolve(&file.path, raw) {
                    Some(j) if j != i => edges.push((i, j)),
                    Some(_) => {
                        trace!("Dropped self-import {} in {}", raw, file.path);
                        dropped += 1;
                    }
                    None => {
                        trace!("Dropped unresolved dependency {} in {}", raw, file.path);
                        dropped += 1;
                    }
                }
            }
        }

        debug!("Resolved {} dependencies, dropped {}", edges.len(), dropped);
        edges
    }
}

/// Composite complexity weight of one node
pub fn node_weight(metrics: &ComplexityMetrics, weights: &WeightConfig) -> f64 {
    weights.cyclomatic * metrics.cyclomatic_complexity
        + weights.cognitive * metrics.cognitive_complexity
        + weights.halstead * (metrics.halstead_volume / 100.0)
        + weights.maintainability * (100.0 - metrics.maintainability_index)
        + weights.coupling * metrics.coupling_between_objects as f64
}
