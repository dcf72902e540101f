//! Graph-level scoring
//!
//! - [`compute_global_metrics`]: complexity aggregates and network topology
//! - [`QualityAssessment`]: health / maintainability / risk / debt scores,
//!   letter grade and the action plan
//! - [`DebtScanner`]: line-level technical debt markers

mod debt;
mod global_metrics;
mod quality;

pub use global_metrics::{
    average_path_length, clustering_coefficient, compute_global_metrics, scale_free_beta,
};
pub use debt::{
    effort_distribution, estimate_effort, quick_wins, severity_breakdown, DebtScanner,
};
pub use quality::{calculate_grade, QualityAssessment};
