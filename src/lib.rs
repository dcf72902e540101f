//! depsight - dependency graph analytics for source corpora
//!
//! Builds a weighted file-level dependency graph from pre-extracted
//! [`FileFacts`], then computes centrality, community structure, global
//! topology metrics and a graded quality assessment.
//!
//! ```no_run
//! use depsight::{AnalysisEngine, EngineConfig, FileFacts};
//!
//! let engine = AnalysisEngine::new(EngineConfig::default())?;
//! let analysis = engine.analyze(&[
//!     FileFacts::new("src/index.js").with_dependencies(["./util"]),
//!     FileFacts::new("src/util.js"),
//! ])?;
//! println!("grade {}", analysis.quality_metrics.grade);
//! # Ok::<(), depsight::AnalysisError>(())
//! ```

pub mod centrality;
pub mod clustering;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod models;
pub mod reporters;
pub mod scoring;

pub use centrality::{CentralityEngine, CentralityScores};
pub use clustering::{ClusteringEngine, CommunityDetector, DetectorRegistry};
pub use config::EngineConfig;
pub use engine::AnalysisEngine;
pub use error::{AlgorithmFailure, AnalysisError, AnalysisResult};
pub use models::{FileFacts, GraphNode, ProjectAnalysis};
pub use reporters::OutputFormat;
