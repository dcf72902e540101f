//! Per-file complexity metrics
//!
//! Everything here is a pure function of one [`FileFacts`] record, so the
//! builder can compute all files in parallel. Graph-dependent fields
//! (fan-in, fan-out, coupling) are filled in after resolution.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{ComplexityMetrics, FileFacts};

/// Keywords that open a new decision path
const BRANCH_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "while", "for", "foreach", "switch", "case", "catch", "except", "?",
];

/// Short-circuit operators, each adding one path
const LOGICAL_OPERATORS: &[&str] = &["&&", "||", "and", "or"];

/// Extensions whose block structure is expressed by indentation
const INDENT_LANGUAGES: &[&str] = &["py", "pyw", "pyi"];

const INDENT_WIDTH: usize = 4;

static COGNITIVE_TRIGGER: OnceLock<Regex> = OnceLock::new();

fn cognitive_trigger() -> &'static Regex {
    COGNITIVE_TRIGGER.get_or_init(|| {
        Regex::new(r"\b(?:if|elif|for|foreach|while|switch|case|catch|except)\b|&&|\|\|")
            .expect("cognitive trigger pattern is valid")
    })
}

/// Compute all file-local metrics for one file
pub fn file_metrics(facts: &FileFacts) -> ComplexityMetrics {
    let cyclomatic = cyclomatic_complexity(facts);
    let cognitive = cognitive_complexity(facts, cyclomatic);
    let halstead = halstead_volume(facts);
    let lloc = facts.logical_lines();

    ComplexityMetrics {
        cyclomatic_complexity: cyclomatic,
        cognitive_complexity: cognitive,
        halstead_volume: halstead,
        maintainability_index: maintainability_index(halstead, cyclomatic, lloc),
        nesting_depth: facts.max_nesting_depth,
        fan_in: 0,
        fan_out: 0,
        coupling_between_objects: 0,
        lines_of_code: lloc,
        comment_density: (facts.comment_lines as f64 / facts.line_count.max(1) as f64).min(1.0),
    }
}

/// 1 + branching keywords + logical operators
pub fn cyclomatic_complexity(facts: &FileFacts) -> f64 {
    let count = |tokens: &[&str]| -> usize {
        tokens
            .iter()
            .filter_map(|t| facts.keyword_counts.get(*t))
            .sum()
    };
    1.0 + (count(BRANCH_KEYWORDS) + count(LOGICAL_OPERATORS)) as f64
}

/// Line scan with a nesting counter, or an estimate when no source is available
pub fn cognitive_complexity(facts: &FileFacts, cyclomatic: f64) -> f64 {
    if facts.source_lines.is_empty() {
        return cyclomatic * 1.2 + facts.max_nesting_depth as f64 * 0.5;
    }

    let total = if is_indent_language(&facts.path) {
        scan_indented(&facts.source_lines)
    } else {
        scan_braced(&facts.source_lines)
    };
    total as f64
}

fn is_indent_language(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| INDENT_LANGUAGES.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn scan_braced(lines: &[String]) -> usize {
    let mut nesting: usize = 0;
    let mut total = 0;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        // Leading closers end the enclosing block before this line counts
        let leading = trimmed.chars().take_while(|c| *c == '}').count();
        nesting = nesting.saturating_sub(leading);

        if cognitive_trigger().is_match(trimmed) {
            total += 1 + nesting;
        }

        let opens = trimmed.matches('{').count();
        let closes = trimmed.matches('}').count() - leading;
        nesting = (nesting + opens).saturating_sub(closes);
    }

    total
}

fn scan_indented(lines: &[String]) -> usize {
    let mut total = 0;

    for line in lines {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let width: usize = line
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
            .sum();

        if cognitive_trigger().is_match(trimmed) {
            total += 1 + width / INDENT_WIDTH;
        }
    }

    total
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with('#')
}

/// (N1 + N2) * log2(n1 + n2)
pub fn halstead_volume(facts: &FileFacts) -> f64 {
    let distinct = |m: &std::collections::BTreeMap<String, usize>| m.values().filter(|&&v| v > 0).count();
    let vocabulary = distinct(&facts.operators) + distinct(&facts.operands);
    if vocabulary == 0 {
        return 0.0;
    }

    let length: usize = facts.operators.values().sum::<usize>() + facts.operands.values().sum::<usize>();
    length as f64 * (vocabulary as f64).log2()
}

/// Classic maintainability index clamped to [0, 100]
pub fn maintainability_index(volume: f64, cyclomatic: f64, lloc: usize) -> f64 {
    let mi = 171.0
        - 5.2 * volume.max(1.0).ln()
        - 0.23 * cyclomatic
        - 16.2 * (lloc.max(1) as f64).ln();
    mi.clamp(0.0, 100.0)
}
