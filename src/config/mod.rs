//! Configuration module for depsight
//!
//! This module handles:
//! - Engine configuration (depsight.toml / .depsightrc.json)
//! - Input limits and weighting constants
//! - Validation before an engine is constructed

mod engine_config;

pub use engine_config::{
    load_config_file,
    load_engine_config,
    CentralityConfig,
    ClusteringConfig,
    DebtConfig,
    EngineConfig,
    LimitsConfig,
    QualityConfig,
    ResolutionConfig,
    SelectionWeights,
    WeightConfig,
    CONFIG_FILE_NAMES,
};
