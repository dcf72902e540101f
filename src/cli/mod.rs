//! CLI command definitions and handlers

mod analyze;
mod init;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// depsight - dependency graph analytics
#[derive(Parser, Debug)]
#[command(name = "depsight")]
#[command(
    version,
    about = "Dependency graph analytics: centrality, clustering and structural quality grades",
    long_about = "depsight builds a weighted file-level dependency graph from extracted \
file facts, then computes centrality, community structure, global topology metrics \
and a graded quality assessment with a prioritized action plan.",
    after_help = "\
Examples:
  depsight analyze facts.json                      Text report to stdout
  depsight analyze facts.json --format json        Full analysis as JSON
  depsight analyze facts.json -f md -o report.md   Markdown report to a file
  depsight init                                    Write a commented depsight.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: one per core)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a JSON array of file facts
    #[command(after_help = "\
Examples:
  depsight analyze facts.json --config depsight.toml
  depsight analyze facts.json --format markdown --output ARCHITECTURE.md")]
    Analyze {
        /// Path to the file facts JSON
        facts: PathBuf,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Configuration file (default: depsight.toml or .depsightrc.json beside the facts file)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Write a depsight.toml with the default settings
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if let Some(workers) = cli.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .with_context(|| format!("Failed to start {} workers", workers))?;
        tracing::debug!("Using {} workers", workers);
    }

    match cli.command {
        Commands::Analyze {
            facts,
            format,
            output,
            config,
        } => analyze::run(&facts, &format, output.as_deref(), config.as_deref()),
        Commands::Init { path } => init::run(&path),
    }
}
