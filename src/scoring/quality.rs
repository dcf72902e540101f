//! Quality assessment: health, maintainability, risk and debt
//!
//! # Scoring Formula
//!
//! ```text
//! structural_health     = 100 × (0.5·modularity + 0.3·clustering + 0.2·(1 − density))
//! maintainability_score = 100 − 2·avg_complexity − 50·mean_cluster_coupling
//! evolutionary_risk     = 10·√variance + 100·high_complexity_fraction
//! technical_debt        = 0.4·risk + 0.4·(100 − maintainability) + 0.2·(100 − health)
//! ```
//!
//! Every score is clamped to [0, 100]. A node is high-complexity when its
//! weight exceeds `high_complexity_multiplier` × the average weight.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::debt::{effort_distribution, estimate_effort, quick_wins, severity_breakdown};
use crate::config::QualityConfig;
use crate::models::{
    ActionPlan, ClusterResult, DebtItem, Effort, GlobalMetrics, GraphNode, PriorityFile,
    QualityMetrics, Severity,
};

/// Clusters coupled above this are called out in recommendations
const COUPLED_CLUSTER_THRESHOLD: f64 = 0.5;

/// Modularity below this is called out in recommendations
const LOW_MODULARITY_THRESHOLD: f64 = 0.3;

/// Betweenness above this marks a hub file
const HUB_BETWEENNESS_THRESHOLD: f64 = 0.2;

/// Priority points added per debt item in a file
const DEBT_PRIORITY_POINTS: f64 = 10.0;

/// More minute-sized items than this earn a quick-win recommendation
const QUICK_WIN_RECOMMENDATION_MIN: usize = 10;

pub struct QualityAssessment<'a> {
    config: &'a QualityConfig,
}

impl<'a> QualityAssessment<'a> {
    pub fn new(config: &'a QualityConfig) -> Self {
        Self { config }
    }

    pub fn assess(
        &self,
        nodes: &IndexMap<String, GraphNode>,
        global: &GlobalMetrics,
        clusters: &[ClusterResult],
        cycles: &[Vec<String>],
    ) -> QualityMetrics {
        let structural_health = clamp_score(
            100.0
                * (0.5 * global.modularity_score
                    + 0.3 * global.clustering_coefficient
                    + 0.2 * (1.0 - global.network_density)),
        );

        let mean_coupling = if clusters.is_empty() {
            0.0
        } else {
            clusters.iter().map(|c| c.coupling).sum::<f64>() / clusters.len() as f64
        };
        let maintainability_score =
            clamp_score(100.0 - 2.0 * global.average_complexity - 50.0 * mean_coupling);

        let high_fraction = if nodes.is_empty() {
            0.0
        } else {
            self.high_complexity_nodes(nodes, global).count() as f64 / nodes.len() as f64
        };
        let evolutionary_risk =
            clamp_score(10.0 * global.complexity_variance.max(0.0).sqrt() + 100.0 * high_fraction);

        let technical_debt = clamp_score(
            0.4 * evolutionary_risk
                + 0.4 * (100.0 - maintainability_score)
                + 0.2 * (100.0 - structural_health),
        );

        let mut quality = QualityMetrics {
            structural_health,
            maintainability_score,
            evolutionary_risk,
            technical_debt,
            grade: String::new(),
        };
        quality.grade = calculate_grade(quality.composite_score(), !cycles.is_empty());
        quality
    }

    fn high_complexity_nodes<'n>(
        &self,
        nodes: &'n IndexMap<String, GraphNode>,
        global: &GlobalMetrics,
    ) -> impl Iterator<Item = &'n GraphNode> {
        let limit = self.config.high_complexity_multiplier * global.average_complexity;
        nodes.values().filter(move |n| n.weight > limit)
    }

    /// Priority files, recommendations and the debt summary
    pub fn action_plan(
        &self,
        nodes: &IndexMap<String, GraphNode>,
        global: &GlobalMetrics,
        clusters: &[ClusterResult],
        cycles: &[Vec<String>],
        debt: &[DebtItem],
    ) -> ActionPlan {
        let mut debt_counts: FxHashMap<&str, usize> = FxHashMap::default();
        for item in debt {
            *debt_counts.entry(item.file.as_str()).or_insert(0) += 1;
        }

        let mut priority_files: Vec<PriorityFile> = nodes
            .values()
            .map(|node| {
                let complexity_score = node.complexity.overall_score();
                let debt_count = debt_counts.get(node.id.as_str()).copied().unwrap_or(0);
                PriorityFile {
                    file: node.id.clone(),
                    priority_score: complexity_score + DEBT_PRIORITY_POINTS * debt_count as f64,
                    complexity_score,
                    debt_count,
                    weight: node.weight,
                    fan_in: node.complexity.fan_in,
                    betweenness: node.centrality.map(|c| c.betweenness).unwrap_or(0.0),
                }
            })
            .filter(|p| p.priority_score > self.config.priority_threshold)
            .collect();
        // Stable sort keeps node order among equal scores
        priority_files.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
        priority_files.truncate(self.config.max_priority_files);

        let mut recommendations = Vec::new();

        let critical = debt.iter().filter(|i| i.severity == Severity::Critical).count();
        if critical > 0 {
            recommendations.push(format!(
                "Address {} critical security/stability issue{} immediately",
                critical,
                if critical == 1 { "" } else { "s" }
            ));
        }

        if !cycles.is_empty() {
            let largest = cycles.iter().map(Vec::len).max().unwrap_or(0);
            recommendations.push(format!(
                "Break {} circular dependency group{} (largest spans {} files)",
                cycles.len(),
                if cycles.len() == 1 { "" } else { "s" },
                largest
            ));
        }

        let mut high: Vec<&GraphNode> = self.high_complexity_nodes(nodes, global).collect();
        if !high.is_empty() {
            high.sort_by(|a, b| b.weight.total_cmp(&a.weight));
            recommendations.push(format!(
                "Refactor {} high-complexity file{}, starting with {}",
                high.len(),
                if high.len() == 1 { "" } else { "s" },
                high[0].id
            ));
        }

        if nodes.len() > 1 && global.modularity_score < LOW_MODULARITY_THRESHOLD {
            recommendations.push(format!(
                "Modularity is low ({:.2}); group related files into clearer modules",
                global.modularity_score
            ));
        }

        for cluster in clusters
            .iter()
            .filter(|c| c.members.len() > 1 && c.coupling > COUPLED_CLUSTER_THRESHOLD)
        {
            recommendations.push(format!(
                "Cluster {} ({} files) has coupling {:.2}; reduce imports crossing its boundary",
                cluster.id,
                cluster.members.len(),
                cluster.coupling
            ));
        }

        let hub = nodes
            .values()
            .filter_map(|n| n.centrality.map(|c| (n, c.betweenness)))
            .filter(|(_, b)| *b > HUB_BETWEENNESS_THRESHOLD)
            .fold(None, |best: Option<(&GraphNode, f64)>, (n, b)| match best {
                Some((_, bb)) if bb >= b => best,
                _ => Some((n, b)),
            });
        if let Some((node, betweenness)) = hub {
            recommendations.push(format!(
                "{} sits on many dependency paths (betweenness {:.2}); consider splitting it",
                node.id, betweenness
            ));
        }

        let minute_items = debt.iter().filter(|i| i.effort == Effort::Minutes).count();
        if minute_items > QUICK_WIN_RECOMMENDATION_MIN {
            recommendations.push(format!(
                "Start with {} quick wins to build momentum",
                minute_items
            ));
        }

        if recommendations.is_empty() {
            recommendations.push("No structural issues detected".to_string());
        }

        ActionPlan {
            priority_files,
            recommendations,
            total_debt_items: debt.len(),
            severity_breakdown: severity_breakdown(debt),
            effort_distribution: effort_distribution(debt),
            quick_wins: quick_wins(debt, self.config.max_quick_wins),
            estimated_effort: estimate_effort(debt),
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Letter grade from a 0-100 composite; circular dependencies cap it at C
pub fn calculate_grade(score: f64, has_cycles: bool) -> String {
    let base_grade = if score >= 97.0 {
        "A+"
    } else if score >= 93.0 {
        "A"
    } else if score >= 90.0 {
        "A-"
    } else if score >= 87.0 {
        "B+"
    } else if score >= 83.0 {
        "B"
    } else if score >= 80.0 {
        "B-"
    } else if score >= 77.0 {
        "C+"
    } else if score >= 73.0 {
        "C"
    } else if score >= 70.0 {
        "C-"
    } else if score >= 67.0 {
        "D+"
    } else if score >= 63.0 {
        "D"
    } else if score >= 60.0 {
        "D-"
    } else {
        "F"
    };

    if has_cycles && (base_grade.starts_with('A') || base_grade.starts_with('B')) {
        "C".to_string()
    } else {
        base_grade.to_string()
    }
}
