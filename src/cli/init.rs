//! Init command - write a commented depsight.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use depsight::config::CONFIG_FILE_NAMES;

const DEFAULT_CONFIG: &str = r#"# depsight configuration
# Every section and key is optional; the values below are the defaults.

[limits]
# Maximum number of files per analysis
max_nodes = 2000
# Maximum size of a single file in bytes (5 MiB)
max_file_size = 5242880

[weights]
# Node weight = Σ coefficient × metric
cyclomatic = 0.25
cognitive = 0.30
# Applied to halstead volume / 100
halstead = 0.20
# Applied to 100 - maintainability index
maintainability = 0.15
# Applied to coupling between objects
coupling = 0.10

[centrality]
damping = 0.85
max_iterations = 100
tolerance = 1e-6
eigen_tolerance = 1e-9
eigen_max_iterations = 10000

[clustering]
# Detectors tried in order; ties keep the earliest
# Available: louvain, spectral, greedy-modularity, hierarchical
algorithms = ["louvain", "spectral", "greedy-modularity"]
louvain_max_iterations = 50
greedy_max_moves = 10000
# Spectral bisection eigensolver; 0 iterations means unbounded
spectral_tolerance = 1e-9
spectral_max_iterations = 10000

[clustering.selection]
modularity = 0.3
silhouette = 0.3
cohesion = 0.2
coupling = 0.2

[resolution]
# Extensions tried when resolving extension-less imports
extensions = [".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".py", ".rs", ".go", ".java"]

[quality]
# Nodes whose weight exceeds multiplier × average complexity count as high complexity
high_complexity_multiplier = 2.0
# Priority score (complexity + 10 per debt item) above which a file is listed
priority_threshold = 50.0
max_priority_files = 10
# Medium/high debt items fixable in minutes, listed in the action plan
max_quick_wins = 5

[debt]
# Line scan for TODO markers, magic numbers, deep indentation, long lines,
# eval/exec and bare except; needs source_lines in the facts
enabled = true
max_line_length = 120
deep_indent = 16
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let dir = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!("  {} Run analysis", style("depsight analyze facts.json").cyan());
    println!(
        "  {} Markdown report",
        style("depsight analyze facts.json -f md -o report.md").cyan()
    );

    Ok(())
}
