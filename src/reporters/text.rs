//! Text (terminal) reporter with colors and formatting

use crate::models::ProjectAnalysis;
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade.chars().next() {
        Some('A') => "\x1b[32m", // Green
        Some('B') => "\x1b[92m", // Light green
        Some('C') => "\x1b[33m", // Yellow
        Some('D') => "\x1b[91m", // Light red
        Some('F') => "\x1b[31m", // Red
        _ => "\x1b[0m",
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Rows shown in the hotspot and cluster tables
const MAX_ROWS: usize = 10;

/// Render analysis as formatted terminal output
pub fn render(analysis: &ProjectAnalysis) -> Result<String> {
    let mut out = String::new();
    let g = &analysis.global_metrics;
    let q = &analysis.quality_metrics;

    // Header
    let grade_c = grade_color(&q.grade);
    out.push_str(&format!("\n{BOLD}depsight Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{:.1}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  ",
        q.composite_score(),
        q.grade
    ));
    out.push_str(&format!(
        "Files: {}  Dependencies: {}  Clusters: {}  Cycles: {}\n\n",
        g.node_count,
        g.edge_count,
        analysis.clusters.len(),
        g.cycle_count
    ));

    // Quality scores (compact)
    out.push_str(&format!("{BOLD}QUALITY{RESET}\n"));
    out.push_str(&format!(
        "  Health: {}  Maintainability: {}  Risk: {}  Debt: {}\n\n",
        format_score(q.structural_health),
        format_score(q.maintainability_score),
        format_inverse_score(q.evolutionary_risk),
        format_inverse_score(q.technical_debt)
    ));

    // Topology
    out.push_str(&format!("{BOLD}TOPOLOGY{RESET}\n"));
    out.push_str(&format!(
        "  Density: {:.3}  Avg path: {:.2}  Clustering: {:.3}  Modularity: {:.3}\n",
        g.network_density, g.average_path_length, g.clustering_coefficient, g.modularity_score
    ));
    out.push_str(&format!(
        "  Small-world: {:.3}  Scale-free β: {:.2}  Complexity avg: {:.2} (σ² {:.2})\n\n",
        g.small_world_coefficient, g.scale_free_beta, g.average_complexity, g.complexity_variance
    ));

    // Hotspots by weight
    let mut hotspots: Vec<_> = analysis.nodes.values().collect();
    hotspots.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    out.push_str(&format!("{BOLD}HOTSPOTS{RESET}\n"));
    out.push_str(&format!(
        "{DIM}  #   WEIGHT   CC    IN  OUT  PAGERANK  FILE{RESET}\n"
    ));
    for (i, node) in hotspots.iter().take(MAX_ROWS).enumerate() {
        let pagerank = node.centrality.map(|c| c.pagerank).unwrap_or(0.0);
        out.push_str(&format!(
            "  {DIM}{:>3}{RESET}  {:>6.2}  {:>4.0}  {:>3}  {:>3}  {:>8.4}  {}\n",
            i + 1,
            node.weight,
            node.complexity.cyclomatic_complexity,
            node.complexity.fan_in,
            node.complexity.fan_out,
            pagerank,
            shorten(&node.id, 40)
        ));
    }
    let remaining = hotspots.len().saturating_sub(MAX_ROWS);
    if remaining > 0 {
        out.push_str(&format!("\n  {DIM}...and {} more (use --format json){RESET}\n", remaining));
    }
    out.push('\n');

    // Clusters
    out.push_str(&format!(
        "{BOLD}CLUSTERS{RESET} ({} via {})\n",
        analysis.clusters.len(),
        analysis.clustering.algorithm
    ));
    for cluster in analysis.clusters.iter().take(MAX_ROWS) {
        out.push_str(&format!(
            "  {DIM}#{:<3}{RESET} {:>3} files  cohesion {:.2}  coupling {:.2}  modularity {:+.3}\n",
            cluster.id,
            cluster.members.len(),
            cluster.cohesion,
            cluster.coupling,
            cluster.modularity
        ));
    }
    out.push('\n');

    // Cycles
    if !analysis.cycles.is_empty() {
        out.push_str(&format!("{BOLD}CIRCULAR DEPENDENCIES{RESET}\n"));
        for cycle in analysis.cycles.iter().take(MAX_ROWS) {
            out.push_str(&format!("  \x1b[91m↻{RESET} {}\n", cycle.join(" ↔ ")));
        }
        out.push('\n');
    }

    // Debt
    let plan = &analysis.action_plan;
    if plan.total_debt_items > 0 {
        let s = &plan.severity_breakdown;
        out.push_str(&format!(
            "{BOLD}DEBT{RESET} ({} items, ~{})\n",
            plan.total_debt_items, plan.estimated_effort
        ));
        out.push_str(&format!(
            "  \x1b[31mcritical {}{RESET}  \x1b[91mhigh {}{RESET}  \x1b[33mmedium {}{RESET}  low {}\n",
            s.critical, s.high, s.medium, s.low
        ));
        for item in &plan.quick_wins {
            out.push_str(&format!(
                "  {DIM}quick win{RESET} {}:{}  {}\n",
                shorten(&item.file, 40),
                item.line,
                item.suggestion
            ));
        }
        out.push('\n');
    }

    // Recommendations
    out.push_str(&format!("{BOLD}RECOMMENDATIONS{RESET}\n"));
    for rec in &analysis.action_plan.recommendations {
        out.push_str(&format!("  • {}\n", rec));
    }

    Ok(out)
}

/// Keep the tail of long paths
fn shorten(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count > max {
        let skip = count - (max - 3);
        format!("...{}", path.chars().skip(skip).collect::<String>())
    } else {
        path.to_string()
    }
}

/// Format score with color, higher is better
fn format_score(score: f64) -> String {
    format!("{}{:.0}{RESET}", score_color(score), score)
}

/// Format score with color, lower is better
fn format_inverse_score(score: f64) -> String {
    format!("{}{:.0}{RESET}", score_color(100.0 - score), score)
}

fn score_color(goodness: f64) -> &'static str {
    if goodness >= 80.0 {
        "\x1b[32m"
    } else if goodness >= 60.0 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    }
}
