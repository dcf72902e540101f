//! Dependency graph construction and shared graph structures
//!
//! - [`GraphBuilder`]: file facts to resolved [`GraphNode`](crate::models::GraphNode)s
//! - [`AdjacencyMatrix`]: the fixed node ordering used everywhere downstream
//! - [`ShortestPaths`]: all-pairs distances and next hops
//! - [`find_cycles`]: circular dependency groups

mod builder;
pub mod complexity;
mod cycles;
mod matrix;
mod paths;
mod resolver;

pub use builder::{node_weight, GraphBuilder};
pub use cycles::find_cycles;
pub use matrix::AdjacencyMatrix;
pub use paths::ShortestPaths;
pub use resolver::DependencyResolver;
