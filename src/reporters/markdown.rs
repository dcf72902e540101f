//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - Architecture notes checked into the repository

use crate::models::ProjectAnalysis;
use anyhow::Result;
use chrono::Local;

/// Maximum rows in each table
const MAX_ROWS: usize = 15;

/// Render analysis as GitHub-flavored Markdown
pub fn render(analysis: &ProjectAnalysis) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(analysis));
    md.push('\n');
    md.push_str(&render_quality(analysis));
    md.push('\n');
    md.push_str(&render_topology(analysis));
    md.push('\n');
    md.push_str(&render_priority_files(analysis));
    md.push('\n');
    md.push_str(&render_clusters(analysis));
    md.push('\n');
    md.push_str(&render_cycles(analysis));
    md.push_str(&render_debt(analysis));
    md.push_str(&render_recommendations(analysis));
    md.push('\n');
    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(analysis: &ProjectAnalysis) -> String {
    let q = &analysis.quality_metrics;
    let grade_emoji = match q.grade.chars().next() {
        Some('A') => "🏆",
        Some('B') => "⭐",
        Some('C') => "⚠️",
        Some('D') => "❌",
        Some('F') => "💀",
        _ => "❓",
    };

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"# {} Dependency Graph Report

**Grade: {}** | **Score: {:.1}/100** | **Files: {}** | **Dependencies: {}**

Generated: {}
"#,
        grade_emoji,
        q.grade,
        q.composite_score(),
        analysis.global_metrics.node_count,
        analysis.global_metrics.edge_count,
        timestamp
    )
}

fn render_quality(analysis: &ProjectAnalysis) -> String {
    let q = &analysis.quality_metrics;
    let mut md = String::from("## Quality\n\n| Metric | Score |\n|--------|------:|\n");
    md.push_str(&format!("| Structural health | {:.1} |\n", q.structural_health));
    md.push_str(&format!("| Maintainability | {:.1} |\n", q.maintainability_score));
    md.push_str(&format!("| Evolutionary risk | {:.1} |\n", q.evolutionary_risk));
    md.push_str(&format!("| Technical debt | {:.1} |\n", q.technical_debt));
    md
}

fn render_topology(analysis: &ProjectAnalysis) -> String {
    let g = &analysis.global_metrics;
    let rows = [
        ("Network density", format!("{:.4}", g.network_density)),
        ("Average path length", format!("{:.3}", g.average_path_length)),
        ("Clustering coefficient", format!("{:.4}", g.clustering_coefficient)),
        ("Small-world coefficient", format!("{:.4}", g.small_world_coefficient)),
        ("Scale-free β", format!("{:.3}", g.scale_free_beta)),
        ("Modularity", format!("{:.4}", g.modularity_score)),
        ("Total complexity", format!("{:.2}", g.total_complexity)),
        ("Average complexity", format!("{:.2}", g.average_complexity)),
        ("Complexity variance", format!("{:.2}", g.complexity_variance)),
    ];

    let mut md = String::from("## Topology\n\n| Metric | Value |\n|--------|------:|\n");
    for (name, value) in rows {
        md.push_str(&format!("| {} | {} |\n", name, value));
    }
    md
}

fn render_priority_files(analysis: &ProjectAnalysis) -> String {
    let files = &analysis.action_plan.priority_files;
    let mut md = String::from("## Priority Files\n\n");
    if files.is_empty() {
        md.push_str("_No file exceeds the priority threshold._\n");
        return md;
    }

    md.push_str("| File | Priority | Complexity | Debt | Weight | Fan-in | Betweenness |\n");
    md.push_str("|------|---------:|-----------:|-----:|-------:|-------:|------------:|\n");
    for p in files.iter().take(MAX_ROWS) {
        md.push_str(&format!(
            "| `{}` | {:.1} | {:.1} | {} | {:.2} | {} | {:.3} |\n",
            p.file,
            p.priority_score,
            p.complexity_score,
            p.debt_count,
            p.weight,
            p.fan_in,
            p.betweenness
        ));
    }
    md
}

fn render_clusters(analysis: &ProjectAnalysis) -> String {
    let mut md = format!(
        "## Clusters\n\nSelected algorithm: **{}** (score {:.3})\n\n",
        analysis.clustering.algorithm, analysis.clustering.score
    );

    if !analysis.clustering.candidates.is_empty() {
        md.push_str("| Candidate | Score | Clusters | Fallback |\n");
        md.push_str("|-----------|------:|---------:|:--------:|\n");
        for c in &analysis.clustering.candidates {
            md.push_str(&format!(
                "| {} | {:.3} | {} | {} |\n",
                c.algorithm,
                c.score,
                c.cluster_count,
                if c.fallback { "yes" } else { "" }
            ));
        }
        md.push('\n');
    }

    md.push_str("| # | Files | Cohesion | Coupling | Modularity | Silhouette | Conductance |\n");
    md.push_str("|---|------:|---------:|---------:|-----------:|-----------:|------------:|\n");
    for c in analysis.clusters.iter().take(MAX_ROWS) {
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {:.3} | {:.3} | {:.2} |\n",
            c.id,
            c.members.len(),
            c.cohesion,
            c.coupling,
            c.modularity,
            c.silhouette_score,
            c.conductance
        ));
    }
    md
}

fn render_cycles(analysis: &ProjectAnalysis) -> String {
    if analysis.cycles.is_empty() {
        return String::new();
    }
    let mut md = String::from("## Circular Dependencies\n\n");
    for cycle in analysis.cycles.iter().take(MAX_ROWS) {
        let files: Vec<String> = cycle.iter().map(|f| format!("`{}`", f)).collect();
        md.push_str(&format!("- {}\n", files.join(" ↔ ")));
    }
    md.push('\n');
    md
}

fn render_debt(analysis: &ProjectAnalysis) -> String {
    let plan = &analysis.action_plan;
    if plan.total_debt_items == 0 {
        return String::new();
    }

    let s = &plan.severity_breakdown;
    let e = &plan.effort_distribution;
    let mut md = format!(
        "## Technical Debt\n\n**{} items** | estimated effort **{}**\n\n",
        plan.total_debt_items, plan.estimated_effort
    );
    md.push_str("| Severity | Count |\n|----------|------:|\n");
    for (name, count) in [
        ("🔴 Critical", s.critical),
        ("🟠 High", s.high),
        ("🟡 Medium", s.medium),
        ("🔵 Low", s.low),
    ] {
        md.push_str(&format!("| {} | {} |\n", name, count));
    }
    md.push_str(&format!(
        "\nEffort: {} in minutes, {} in hours, {} in days\n\n",
        e.minutes, e.hours, e.days
    ));

    if !plan.quick_wins.is_empty() {
        md.push_str("### Quick Wins\n\n");
        for item in &plan.quick_wins {
            md.push_str(&format!(
                "- `{}:{}` {}: {}\n",
                item.file, item.line, item.description, item.suggestion
            ));
        }
        md.push('\n');
    }
    md
}

fn render_recommendations(analysis: &ProjectAnalysis) -> String {
    let mut md = String::from("## Recommendations\n\n");
    for (i, rec) in analysis.action_plan.recommendations.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, rec));
    }
    md
}

fn render_footer() -> String {
    "---\n\n_Generated by depsight_\n".to_string()
}
