//! JSON reporter
//!
//! Outputs the full ProjectAnalysis as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::ProjectAnalysis;
use anyhow::Result;

/// Render analysis as JSON
pub fn render(analysis: &ProjectAnalysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
