//! Output reporters for depsight analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON of the full `ProjectAnalysis`
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::models::ProjectAnalysis;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render an analysis in the given format
pub fn render(analysis: &ProjectAnalysis, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(analysis),
        OutputFormat::Json => json::render(analysis),
        OutputFormat::Markdown => markdown::render(analysis),
    }
}

impl OutputFormat {
    /// Extension given to report files written without one
    pub fn file_extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{AnalysisEngine, EngineConfig, FileFacts};

    /// Small three-file analysis with one import cycle and two debt markers
    pub(crate) fn test_analysis() -> ProjectAnalysis {
        let engine = AnalysisEngine::new(EngineConfig::default()).expect("default config");
        engine
            .analyze(&[
                FileFacts::new("src/index.js")
                    .with_dependencies(["./api", "./util"])
                    .with_keyword("if", 4),
                FileFacts::new("src/api.js")
                    .with_dependencies(["./util"])
                    .with_source("// TODO: split handlers\nconst out = eval(input);"),
                FileFacts::new("src/util.js").with_dependencies(["./api"]),
            ])
            .expect("analysis")
    }

    #[test]
    fn test_format_parsing() {
        let parsed: Vec<OutputFormat> = ["txt", "JSON", "md", "Markdown"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(
            parsed,
            vec![OutputFormat::Text, OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Markdown]
        );
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(OutputFormat::Markdown.file_extension(), "md");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
