//! Analyze command - load file facts, run the engine, render a report

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use depsight::config::{load_config_file, load_engine_config};
use depsight::reporters::{self, OutputFormat};
use depsight::{AnalysisEngine, EngineConfig, FileFacts};

/// Run the analyze command
pub fn run(facts_path: &Path, format: &str, output: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let files = read_facts(facts_path)?;
    let config = resolve_config(facts_path, config_path)?;

    let engine = AnalysisEngine::new(config).context("Invalid engine configuration")?;
    debug!("Detectors: {}", engine.detector_names().join(", "));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style()?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Analyzing {} files...", files.len()));

    let result = engine.analyze(&files);
    spinner.finish_and_clear();
    let analysis = result.with_context(|| format!("Analysis of {} failed", facts_path.display()))?;

    let report = reporters::render(&analysis, format)?;
    match output {
        Some(path) => {
            let path = &with_default_extension(path, format);
            std::fs::write(path, &report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Wrote {} report to {}", format, path.display());
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", report),
    }

    Ok(())
}

/// Read a JSON array of file facts
fn read_facts(path: &Path) -> Result<Vec<FileFacts>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let files: Vec<FileFacts> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse file facts from {}", path.display()))?;
    debug!("Loaded {} file facts from {}", files.len(), path.display());
    Ok(files)
}

/// Explicit --config wins; otherwise search the facts file's directory
fn resolve_config(facts_path: &Path, config_path: Option<&Path>) -> Result<EngineConfig> {
    match config_path {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let dir = facts_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Ok(load_engine_config(dir))
        }
    }
}

/// `report` becomes `report.md` for markdown; explicit extensions are kept
fn with_default_extension(path: &Path, format: OutputFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.file_extension())
    }
}

/// Create spinner progress style
fn create_spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")?)
}
