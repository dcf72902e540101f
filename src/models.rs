//! Core data models for depsight
//!
//! These models describe the engine input ([`FileFacts`]), the per-node graph
//! records and the complete [`ProjectAnalysis`] returned to callers.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::AdjacencyMatrix;

/// Structural facts about one source file, produced by an upstream extractor.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileFacts {
    pub path: String,
    /// Raw dependency identifiers in declaration order (imports, requires)
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub line_count: usize,
    #[serde(default)]
    pub non_empty_lines: usize,
    #[serde(default)]
    pub comment_lines: usize,
    /// Keyword / operator token -> occurrence count (`if`, `for`, `&&`, ...)
    #[serde(default)]
    pub keyword_counts: BTreeMap<String, usize>,
    /// Maximum bracket nesting depth over the raw text
    #[serde(default)]
    pub max_nesting_depth: usize,
    /// Halstead operator token -> frequency
    #[serde(default)]
    pub operators: BTreeMap<String, usize>,
    /// Halstead operand token -> frequency
    #[serde(default)]
    pub operands: BTreeMap<String, usize>,
    /// Raw source lines, used for the cognitive complexity scan when present
    #[serde(default)]
    pub source_lines: Vec<String>,
    /// Size of the file on disk
    #[serde(default)]
    pub size_bytes: u64,
}

impl FileFacts {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keyword(mut self, keyword: &str, count: usize) -> Self {
        self.keyword_counts.insert(keyword.to_string(), count);
        self
    }

    pub fn with_lines(mut self, total: usize, non_empty: usize, comments: usize) -> Self {
        self.line_count = total;
        self.non_empty_lines = non_empty;
        self.comment_lines = comments;
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source_lines = source.lines().map(str::to_string).collect();
        self
    }

    /// Lines that are neither blank nor comments
    pub fn logical_lines(&self) -> usize {
        self.non_empty_lines.saturating_sub(self.comment_lines)
    }
}

/// Complexity metrics derived for one file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ComplexityMetrics {
    pub cyclomatic_complexity: f64,
    pub cognitive_complexity: f64,
    pub halstead_volume: f64,
    /// 0-100, higher is more maintainable
    pub maintainability_index: f64,
    pub nesting_depth: usize,
    pub fan_in: usize,
    pub fan_out: usize,
    pub coupling_between_objects: usize,
    pub lines_of_code: usize,
    pub comment_density: f64,
}

impl ComplexityMetrics {
    /// Normalized complexity score (0-100, lower is better).
    ///
    /// Each metric is scaled onto 0-100 before weighting so that a single
    /// runaway metric cannot push the score out of range.
    pub fn overall_score(&self) -> f64 {
        let cyclomatic = (self.cyclomatic_complexity * 2.0).min(100.0);
        let cognitive = (self.cognitive_complexity * 1.5).min(100.0);
        let nesting = (self.nesting_depth as f64 * 10.0).min(100.0);
        let coupling = (self.coupling_between_objects as f64 * 5.0).min(100.0);
        let maintainability = (100.0 - self.maintainability_index).max(0.0);

        let score = 0.25 * cyclomatic
            + 0.30 * cognitive
            + 0.15 * nesting
            + 0.20 * coupling
            + 0.10 * maintainability;
        score.clamp(0.0, 100.0)
    }
}

/// Centrality scores for one node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Centrality {
    pub betweenness: f64,
    pub closeness: f64,
    pub eigenvector: f64,
    pub pagerank: f64,
}

/// One analyzed file as a graph vertex
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub complexity: ComplexityMetrics,
    /// Files this file depends on (resolved node ids)
    pub dependencies: IndexSet<String>,
    /// Files depending on this file (resolved node ids)
    pub dependents: IndexSet<String>,
    /// Composite complexity weight
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centrality: Option<Centrality>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, complexity: ComplexityMetrics) -> Self {
        Self {
            id: id.into(),
            complexity,
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
            weight: 0.0,
            centrality: None,
        }
    }
}

/// A detected community of files
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClusterResult {
    pub id: usize,
    pub members: Vec<String>,
    pub cohesion: f64,
    pub coupling: f64,
    pub modularity: f64,
    pub silhouette_score: f64,
    pub internal_density: f64,
    pub external_density: f64,
    pub conductance: f64,
}

/// Composite score of one clustering candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateScore {
    pub algorithm: String,
    pub score: f64,
    pub cluster_count: usize,
    /// True when the detector failed and the hierarchical fallback stood in
    pub fallback: bool,
}

/// Which clustering won and how the candidates compared
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClusteringSummary {
    pub algorithm: String,
    pub score: f64,
    pub candidates: Vec<CandidateScore>,
}

/// Whole-graph statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GlobalMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub total_complexity: f64,
    pub average_complexity: f64,
    pub complexity_variance: f64,
    pub modularity_score: f64,
    pub network_density: f64,
    pub average_path_length: f64,
    pub clustering_coefficient: f64,
    pub small_world_coefficient: f64,
    pub scale_free_beta: f64,
    /// Number of circular dependency groups (strongly connected, size >= 2)
    pub cycle_count: usize,
}

/// Composite health, risk and debt scores (all 0-100)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct QualityMetrics {
    pub structural_health: f64,
    pub maintainability_score: f64,
    pub evolutionary_risk: f64,
    pub technical_debt: f64,
    pub grade: String,
}

impl QualityMetrics {
    /// Single 0-100 score, higher is better
    pub fn composite_score(&self) -> f64 {
        let score = (self.structural_health
            + self.maintainability_score
            + (100.0 - self.evolutionary_risk)
            + (100.0 - self.technical_debt))
            / 4.0;
        score.clamp(0.0, 100.0)
    }
}

/// Severity of a debt item
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtCategory {
    Complexity,
    Maintainability,
    Security,
}

/// Rough size of the fix for a debt item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Minutes,
    Hours,
    Days,
}

impl Effort {
    /// Hours charged to the effort estimate
    pub fn hours(self) -> f64 {
        match self {
            Effort::Minutes => 0.1,
            Effort::Hours => 1.0,
            Effort::Days => 8.0,
        }
    }
}

/// One line-level technical debt marker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtItem {
    pub file: String,
    /// 1-based
    pub line: usize,
    /// Stable pattern name, e.g. `todo`, `magic-number`
    pub kind: String,
    pub severity: Severity,
    pub category: DebtCategory,
    pub description: String,
    pub suggestion: String,
    pub effort: Effort,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EffortDistribution {
    pub minutes: usize,
    pub hours: usize,
    pub days: usize,
}

/// A file worth refactoring first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriorityFile {
    pub file: String,
    /// complexity_score + 10 per debt item in the file
    pub priority_score: f64,
    pub complexity_score: f64,
    pub debt_count: usize,
    pub weight: f64,
    pub fan_in: usize,
    pub betweenness: f64,
}

/// Prioritized follow-up work derived from the analysis
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ActionPlan {
    pub priority_files: Vec<PriorityFile>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub total_debt_items: usize,
    #[serde(default)]
    pub severity_breakdown: SeverityBreakdown,
    #[serde(default)]
    pub effort_distribution: EffortDistribution,
    /// Medium or high severity items fixable in minutes
    #[serde(default)]
    pub quick_wins: Vec<DebtItem>,
    /// Human-readable total, e.g. "3 days"
    #[serde(default)]
    pub estimated_effort: String,
}

/// Complete result of one analysis batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectAnalysis {
    pub nodes: IndexMap<String, GraphNode>,
    pub adjacency_matrix: AdjacencyMatrix,
    pub clusters: Vec<ClusterResult>,
    pub clustering: ClusteringSummary,
    pub global_metrics: GlobalMetrics,
    pub quality_metrics: QualityMetrics,
    /// Circular dependency groups, each listed in node order
    pub cycles: Vec<Vec<String>>,
    /// Line-level debt markers, in file then line order
    #[serde(default)]
    pub debt_items: Vec<DebtItem>,
    pub action_plan: ActionPlan,
}

impl ProjectAnalysis {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Cluster containing the given node
    pub fn cluster_of(&self, id: &str) -> Option<&ClusterResult> {
        self.clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m == id))
    }
}
