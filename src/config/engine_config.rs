//! Engine configuration
//!
//! Loaded from `depsight.toml` or `.depsightrc.json`. Every section and field
//! is optional; missing values take the defaults below.
//!
//! ```toml
//! # depsight.toml
//!
//! [limits]
//! max_nodes = 2000
//! max_file_size = 5242880
//!
//! [weights]
//! cyclomatic = 0.25
//! cognitive = 0.30
//! halstead = 0.20
//! maintainability = 0.15
//! coupling = 0.10
//!
//! [centrality]
//! damping = 0.85
//!
//! [clustering]
//! algorithms = ["louvain", "spectral", "greedy-modularity"]
//!
//! [resolution]
//! extensions = [".js", ".ts", ".py"]
//!
//! [quality]
//! priority_threshold = 50.0
//!
//! [debt]
//! max_line_length = 120
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};

/// File names searched by [`load_engine_config`], in order
pub const CONFIG_FILE_NAMES: &[&str] = &["depsight.toml", ".depsightrc.json"];

/// Complete engine configuration. Immutable once handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub debt: DebtConfig,
}

/// Input-size caps, checked before any computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of files per analysis (default: 2000)
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Maximum size of a single file in bytes (default: 5 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_nodes() -> usize {
    2000
}
fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

/// Coefficients of the node weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_cyclomatic_weight")]
    pub cyclomatic: f64,
    #[serde(default = "default_cognitive_weight")]
    pub cognitive: f64,
    /// Applied to halstead volume / 100
    #[serde(default = "default_halstead_weight")]
    pub halstead: f64,
    /// Applied to 100 - maintainability index
    #[serde(default = "default_maintainability_weight")]
    pub maintainability: f64,
    #[serde(default = "default_coupling_weight")]
    pub coupling: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            cyclomatic: default_cyclomatic_weight(),
            cognitive: default_cognitive_weight(),
            halstead: default_halstead_weight(),
            maintainability: default_maintainability_weight(),
            coupling: default_coupling_weight(),
        }
    }
}

fn default_cyclomatic_weight() -> f64 {
    0.25
}
fn default_cognitive_weight() -> f64 {
    0.30
}
fn default_halstead_weight() -> f64 {
    0.20
}
fn default_maintainability_weight() -> f64 {
    0.15
}
fn default_coupling_weight() -> f64 {
    0.10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    /// PageRank damping factor (default: 0.85)
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// PageRank iteration cap (default: 100)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// PageRank L1 convergence threshold (default: 1e-6)
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Eigendecomposition convergence threshold
    #[serde(default = "default_eigen_tolerance")]
    pub eigen_tolerance: f64,
    /// Eigendecomposition iteration cap, 0 means unbounded
    #[serde(default = "default_eigen_max_iterations")]
    pub eigen_max_iterations: usize,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            eigen_tolerance: default_eigen_tolerance(),
            eigen_max_iterations: default_eigen_max_iterations(),
        }
    }
}

fn default_damping() -> f64 {
    0.85
}
fn default_max_iterations() -> usize {
    100
}
fn default_tolerance() -> f64 {
    1e-6
}
fn default_eigen_tolerance() -> f64 {
    1e-9
}
fn default_eigen_max_iterations() -> usize {
    10_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Detectors to run, in tie-break order
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<String>,
    /// Sweep cap for Louvain local moving (default: 50)
    #[serde(default = "default_louvain_max_iterations")]
    pub louvain_max_iterations: usize,
    /// Move cap for greedy modularity (default: 10000)
    #[serde(default = "default_greedy_max_moves")]
    pub greedy_max_moves: usize,
    /// Laplacian eigendecomposition convergence threshold for spectral bisection
    #[serde(default = "default_eigen_tolerance")]
    pub spectral_tolerance: f64,
    /// Laplacian eigendecomposition iteration cap, 0 means unbounded
    #[serde(default = "default_eigen_max_iterations")]
    pub spectral_max_iterations: usize,
    #[serde(default)]
    pub selection: SelectionWeights,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
            louvain_max_iterations: default_louvain_max_iterations(),
            greedy_max_moves: default_greedy_max_moves(),
            spectral_tolerance: default_eigen_tolerance(),
            spectral_max_iterations: default_eigen_max_iterations(),
            selection: SelectionWeights::default(),
        }
    }
}

fn default_algorithms() -> Vec<String> {
    vec![
        "louvain".to_string(),
        "spectral".to_string(),
        "greedy-modularity".to_string(),
    ]
}
fn default_louvain_max_iterations() -> usize {
    50
}
fn default_greedy_max_moves() -> usize {
    10_000
}

/// Weights of the composite used to pick the winning partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    #[serde(default = "default_selection_modularity")]
    pub modularity: f64,
    #[serde(default = "default_selection_silhouette")]
    pub silhouette: f64,
    #[serde(default = "default_selection_cohesion")]
    pub cohesion: f64,
    /// Applied to 1 - coupling
    #[serde(default = "default_selection_coupling")]
    pub coupling: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            modularity: default_selection_modularity(),
            silhouette: default_selection_silhouette(),
            cohesion: default_selection_cohesion(),
            coupling: default_selection_coupling(),
        }
    }
}

fn default_selection_modularity() -> f64 {
    0.3
}
fn default_selection_silhouette() -> f64 {
    0.3
}
fn default_selection_cohesion() -> f64 {
    0.2
}
fn default_selection_coupling() -> f64 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Extensions tried when resolving relative identifiers
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    [".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".py", ".rs", ".go", ".java"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// A node is high-complexity above this multiple of the average weight (default: 2.0)
    #[serde(default = "default_high_complexity_multiplier")]
    pub high_complexity_multiplier: f64,
    /// Priority score a file must exceed to enter the action plan (default: 50.0)
    #[serde(default = "default_priority_threshold")]
    pub priority_threshold: f64,
    /// Maximum number of priority files (default: 10)
    #[serde(default = "default_max_priority_files")]
    pub max_priority_files: usize,
    /// Maximum quick wins listed in the action plan (default: 5)
    #[serde(default = "default_max_quick_wins")]
    pub max_quick_wins: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            high_complexity_multiplier: default_high_complexity_multiplier(),
            priority_threshold: default_priority_threshold(),
            max_priority_files: default_max_priority_files(),
            max_quick_wins: default_max_quick_wins(),
        }
    }
}

fn default_high_complexity_multiplier() -> f64 {
    2.0
}
fn default_priority_threshold() -> f64 {
    50.0
}
fn default_max_priority_files() -> usize {
    10
}

/// Line-level debt scan over `FileFacts::source_lines`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtConfig {
    /// Run the scan at all (default: true)
    #[serde(default = "default_debt_enabled")]
    pub enabled: bool,
    /// Lines at least this many characters long are flagged (default: 120)
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Leading whitespace of at least this width counts as deep nesting (default: 16)
    #[serde(default = "default_deep_indent")]
    pub deep_indent: usize,
}

impl Default for DebtConfig {
    fn default() -> Self {
        Self {
            enabled: default_debt_enabled(),
            max_line_length: default_max_line_length(),
            deep_indent: default_deep_indent(),
        }
    }
}

fn default_debt_enabled() -> bool {
    true
}
fn default_max_line_length() -> usize {
    120
}
fn default_deep_indent() -> usize {
    16
}
fn default_max_quick_wins() -> usize {
    5
}

impl EngineConfig {
    /// Reject values the algorithms cannot work with
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.limits.max_nodes == 0 {
            return Err(invalid("limits.max_nodes must be at least 1"));
        }

        let weights = [
            ("weights.cyclomatic", self.weights.cyclomatic),
            ("weights.cognitive", self.weights.cognitive),
            ("weights.halstead", self.weights.halstead),
            ("weights.maintainability", self.weights.maintainability),
            ("weights.coupling", self.weights.coupling),
            ("clustering.selection.modularity", self.clustering.selection.modularity),
            ("clustering.selection.silhouette", self.clustering.selection.silhouette),
            ("clustering.selection.cohesion", self.clustering.selection.cohesion),
            ("clustering.selection.coupling", self.clustering.selection.coupling),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a finite non-negative number", name)));
            }
        }

        let c = &self.centrality;
        if !c.damping.is_finite() || c.damping <= 0.0 || c.damping >= 1.0 {
            return Err(invalid("centrality.damping must be in (0, 1)"));
        }
        if c.max_iterations == 0 {
            return Err(invalid("centrality.max_iterations must be at least 1"));
        }
        if !c.tolerance.is_finite() || c.tolerance <= 0.0 {
            return Err(invalid("centrality.tolerance must be positive"));
        }
        if !c.eigen_tolerance.is_finite() || c.eigen_tolerance < 0.0 {
            return Err(invalid("centrality.eigen_tolerance must be non-negative"));
        }

        if self.clustering.algorithms.is_empty() {
            return Err(invalid("clustering.algorithms must name at least one detector"));
        }
        if self.clustering.louvain_max_iterations == 0 {
            return Err(invalid("clustering.louvain_max_iterations must be at least 1"));
        }
        let st = self.clustering.spectral_tolerance;
        if !st.is_finite() || st < 0.0 {
            return Err(invalid("clustering.spectral_tolerance must be non-negative"));
        }

        let q = &self.quality;
        if !q.high_complexity_multiplier.is_finite() || q.high_complexity_multiplier <= 0.0 {
            return Err(invalid("quality.high_complexity_multiplier must be positive"));
        }
        if !q.priority_threshold.is_finite() || !(0.0..=100.0).contains(&q.priority_threshold) {
            return Err(invalid("quality.priority_threshold must be in [0, 100]"));
        }

        if self.debt.max_line_length == 0 || self.debt.deep_indent == 0 {
            return Err(invalid("debt.max_line_length and debt.deep_indent must be at least 1"));
        }

        if self
            .resolution
            .extensions
            .iter()
            .any(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(invalid("resolution.extensions entries must look like \".js\""));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidConfig(msg.into())
}

/// Discover and load configuration from a project directory.
///
/// Tries `depsight.toml` then `.depsightrc.json`; a file that fails to parse
/// is skipped with a warning. Falls back to defaults.
pub fn load_engine_config(dir: &Path) -> EngineConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded engine config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No engine config found, using defaults");
    EngineConfig::default()
}

/// Load configuration from an explicit file, TOML or JSON by extension
pub fn load_config_file(path: &Path) -> anyhow::Result<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config: EngineConfig = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_nodes, 2000);
        assert_eq!(config.limits.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.clustering.louvain_max_iterations, 50);
        assert_eq!(config.quality.high_complexity_multiplier, 2.0);
    }

    #[test]
    fn test_partial_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
[weights]
cyclomatic = 0.5

[clustering]
algorithms = ["spectral"]
"#,
        )
        .unwrap();

        assert_eq!(config.weights.cyclomatic, 0.5);
        assert_eq!(config.weights.cognitive, 0.30);
        assert_eq!(config.clustering.algorithms, vec!["spectral"]);
        assert_eq!(config.clustering.louvain_max_iterations, 50);
        assert_eq!(config.clustering.spectral_max_iterations, 10_000);
        assert_eq!(config.centrality.damping, 0.85);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.centrality.damping = 1.5;
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));

        let mut config = EngineConfig::default();
        config.weights.halstead = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.clustering.algorithms.clear();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.clustering.spectral_tolerance = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.debt.deep_indent = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.resolution.extensions = vec!["js".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_engine_config_toml() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("depsight.toml"),
            "[limits]\nmax_nodes = 10\n",
        )
        .unwrap();

        let config = load_engine_config(dir.path());
        assert_eq!(config.limits.max_nodes, 10);
    }

    #[test]
    fn test_load_engine_config_json() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".depsightrc.json"),
            r#"{"quality": {"max_priority_files": 3}}"#,
        )
        .unwrap();

        let config = load_engine_config(dir.path());
        assert_eq!(config.quality.max_priority_files, 3);
    }

    #[test]
    fn test_load_engine_config_falls_back() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("depsight.toml"), "not [valid toml").unwrap();
        assert_eq!(load_engine_config(dir.path()), EngineConfig::default());
    }
}
