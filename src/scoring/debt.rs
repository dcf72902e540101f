//! Line-level technical debt scan
//!
//! Runs over `FileFacts::source_lines` when the extractor supplies them.
//! Each line is checked against every rule; a rule fires at most once per
//! line.
//!
//! | Kind            | Severity | Effort  | Trigger                               |
//! |-----------------|----------|---------|---------------------------------------|
//! | `todo`          | medium   | hours   | `TODO` / `FIXME` / `HACK` / `XXX` comment |
//! | `magic-number`  | low      | minutes | 2+ digit literal outside a comment    |
//! | `deep-nesting`  | medium   | hours   | leading whitespace ≥ `deep_indent`    |
//! | `long-line`     | low      | minutes | line ≥ `max_line_length` characters   |
//! | `unsafe-eval`   | critical | days    | `eval(` / `exec(`                     |
//! | `bare-except`   | medium   | minutes | `except:` with no exception type      |

use rayon::prelude::*;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::config::DebtConfig;
use crate::models::{
    DebtCategory, DebtItem, Effort, EffortDistribution, FileFacts, Severity, SeverityBreakdown,
};

struct Rule {
    kind: &'static str,
    severity: Severity,
    category: DebtCategory,
    description: &'static str,
    suggestion: &'static str,
    effort: Effort,
}

impl Rule {
    fn item(&self, file: &str, line: usize) -> DebtItem {
        DebtItem {
            file: file.to_string(),
            line,
            kind: self.kind.to_string(),
            severity: self.severity,
            category: self.category,
            description: self.description.to_string(),
            suggestion: self.suggestion.to_string(),
            effort: self.effort,
        }
    }
}

const TODO: Rule = Rule {
    kind: "todo",
    severity: Severity::Medium,
    category: DebtCategory::Maintainability,
    description: "Unfinished work or temporary fix",
    suggestion: "Complete the item or track it as an issue",
    effort: Effort::Hours,
};

const MAGIC_NUMBER: Rule = Rule {
    kind: "magic-number",
    severity: Severity::Low,
    category: DebtCategory::Maintainability,
    description: "Magic number",
    suggestion: "Replace with a named constant",
    effort: Effort::Minutes,
};

const DEEP_NESTING: Rule = Rule {
    kind: "deep-nesting",
    severity: Severity::Medium,
    category: DebtCategory::Complexity,
    description: "Deeply nested code",
    suggestion: "Extract functions or return early",
    effort: Effort::Hours,
};

const LONG_LINE: Rule = Rule {
    kind: "long-line",
    severity: Severity::Low,
    category: DebtCategory::Maintainability,
    description: "Line exceeds recommended length",
    suggestion: "Break the line up",
    effort: Effort::Minutes,
};

const UNSAFE_EVAL: Rule = Rule {
    kind: "unsafe-eval",
    severity: Severity::Critical,
    category: DebtCategory::Security,
    description: "Dynamic code execution",
    suggestion: "Replace eval/exec with an explicit dispatch or parser",
    effort: Effort::Days,
};

const BARE_EXCEPT: Rule = Rule {
    kind: "bare-except",
    severity: Severity::Medium,
    category: DebtCategory::Maintainability,
    description: "Bare except catches everything",
    suggestion: "Catch specific exceptions",
    effort: Effort::Minutes,
};

static TODO_PATTERN: OnceLock<Regex> = OnceLock::new();
static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();
static EVAL_PATTERN: OnceLock<Regex> = OnceLock::new();
static BARE_EXCEPT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn todo_pattern() -> &'static Regex {
    TODO_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:#|//|/\*|\*)\s*(?:TODO|FIXME|HACK|XXX)\b")
            .expect("todo pattern is valid")
    })
}

fn number_pattern() -> &'static Regex {
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"\b\d{2,}\b").expect("number pattern is valid"))
}

fn eval_pattern() -> &'static Regex {
    EVAL_PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b(?:eval|exec)\s*\(").expect("eval pattern is valid"))
}

fn bare_except_pattern() -> &'static Regex {
    BARE_EXCEPT_PATTERN.get_or_init(|| {
        Regex::new(r"\bexcept\s*:\s*(?:#.*)?$").expect("bare except pattern is valid")
    })
}

pub struct DebtScanner<'a> {
    config: &'a DebtConfig,
}

impl<'a> DebtScanner<'a> {
    pub fn new(config: &'a DebtConfig) -> Self {
        Self { config }
    }

    /// Scan every file in parallel; items come back in file then line order
    pub fn scan(&self, files: &[&FileFacts]) -> Vec<DebtItem> {
        if !self.config.enabled {
            return Vec::new();
        }
        let per_file: Vec<Vec<DebtItem>> = files.par_iter().map(|f| self.scan_file(f)).collect();
        let items: Vec<DebtItem> = per_file.into_iter().flatten().collect();
        debug!("Debt scan found {} items in {} files", items.len(), files.len());
        items
    }

    pub fn scan_file(&self, facts: &FileFacts) -> Vec<DebtItem> {
        let mut items = Vec::new();
        for (i, line) in facts.source_lines.iter().enumerate() {
            let line_no = i + 1;
            let trimmed = line.trim_start();
            let is_comment = is_comment_line(trimmed);

            if todo_pattern().is_match(line) {
                items.push(TODO.item(&facts.path, line_no));
            }
            if !is_comment && has_magic_number(line) {
                items.push(MAGIC_NUMBER.item(&facts.path, line_no));
            }
            let indent = line.chars().take_while(|c| c.is_whitespace()).count();
            if !trimmed.is_empty() && indent >= self.config.deep_indent {
                items.push(DEEP_NESTING.item(&facts.path, line_no));
            }
            if line.chars().count() >= self.config.max_line_length {
                items.push(LONG_LINE.item(&facts.path, line_no));
            }
            if !is_comment && eval_pattern().is_match(line) {
                items.push(UNSAFE_EVAL.item(&facts.path, line_no));
            }
            if bare_except_pattern().is_match(line) {
                items.push(BARE_EXCEPT.item(&facts.path, line_no));
            }
        }
        items
    }
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with('*')
}

/// Two or more digits not part of a dotted literal like `1.25` or `v2.10`
fn has_magic_number(line: &str) -> bool {
    let bytes = line.as_bytes();
    number_pattern().find_iter(line).any(|m| {
        let before = m.start().checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(m.end()).copied();
        before != Some(b'.') && after != Some(b'.')
    })
}

pub fn severity_breakdown(items: &[DebtItem]) -> SeverityBreakdown {
    let mut breakdown = SeverityBreakdown::default();
    for item in items {
        match item.severity {
            Severity::Critical => breakdown.critical += 1,
            Severity::High => breakdown.high += 1,
            Severity::Medium => breakdown.medium += 1,
            Severity::Low => breakdown.low += 1,
        }
    }
    breakdown
}

pub fn effort_distribution(items: &[DebtItem]) -> EffortDistribution {
    let mut dist = EffortDistribution::default();
    for item in items {
        match item.effort {
            Effort::Minutes => dist.minutes += 1,
            Effort::Hours => dist.hours += 1,
            Effort::Days => dist.days += 1,
        }
    }
    dist
}

/// Total effort in hours, days (8h) or weeks (40h), truncated
pub fn estimate_effort(items: &[DebtItem]) -> String {
    let total: f64 = items.iter().map(|i| i.effort.hours()).sum();
    if total < 8.0 {
        format!("{} hours", total as u64)
    } else if total < 40.0 {
        format!("{} days", (total / 8.0) as u64)
    } else {
        format!("{} weeks", (total / 40.0) as u64)
    }
}

/// Medium or high severity items fixable in minutes, first `limit` in order
pub fn quick_wins(items: &[DebtItem], limit: usize) -> Vec<DebtItem> {
    items
        .iter()
        .filter(|i| i.effort == Effort::Minutes)
        .filter(|i| matches!(i.severity, Severity::Medium | Severity::High))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(path: &str, source: &str) -> Vec<DebtItem> {
        let config = DebtConfig::default();
        DebtScanner::new(&config).scan_file(&FileFacts::new(path).with_source(source))
    }

    fn kinds(items: &[DebtItem]) -> Vec<&str> {
        items.iter().map(|i| i.kind.as_str()).collect()
    }

    #[test]
    fn test_todo_markers() {
        let items = scan("a.py", "x = 1  # TODO: remove\n# fixme later\nok = 2");
        assert_eq!(kinds(&items), vec!["todo", "todo"]);
        assert_eq!(items[0].line, 1);
        assert_eq!(items[1].line, 2);

        let items = scan("a.js", "// HACK around the cache\n/* XXX */");
        assert_eq!(kinds(&items), vec!["todo", "todo"]);
        // "todo" inside an identifier is not a marker
        assert!(scan("a.js", "const todoList = [];").is_empty());
    }

    #[test]
    fn test_magic_numbers() {
        assert_eq!(kinds(&scan("a.js", "const timeout = wait(3000);")), vec!["magic-number"]);
        assert!(scan("a.js", "let x = 7;").is_empty());
        assert!(scan("a.js", "let ratio = 1.25;").is_empty());
        assert!(scan("a.js", "let name = v12;").is_empty());
        assert!(scan("a.js", "// retry 500 times").is_empty());
        // One item per line regardless of how many numbers
        assert_eq!(scan("a.js", "f(10, 20, 30);").len(), 1);
    }

    #[test]
    fn test_deep_nesting_and_long_lines() {
        let deep = format!("{}return x;", " ".repeat(16));
        assert_eq!(kinds(&scan("a.js", &deep)), vec!["deep-nesting"]);
        let shallow = format!("{}return x;", " ".repeat(15));
        assert!(scan("a.js", &shallow).is_empty());
        // Whitespace-only lines are not nesting
        assert!(scan("a.js", &" ".repeat(20)).is_empty());

        let long = "a".repeat(120);
        assert_eq!(kinds(&scan("a.js", &long)), vec!["long-line"]);
        assert!(scan("a.js", &"a".repeat(119)).is_empty());
    }

    #[test]
    fn test_eval_and_bare_except() {
        let items = scan("a.py", "result = eval(expr)");
        assert_eq!(kinds(&items), vec!["unsafe-eval"]);
        assert_eq!(items[0].severity, Severity::Critical);
        assert_eq!(items[0].category, DebtCategory::Security);
        assert!(scan("a.py", "evaluate(expr)").is_empty());

        assert_eq!(kinds(&scan("a.py", "    except:")), vec!["bare-except"]);
        assert_eq!(kinds(&scan("a.py", "except:  # swallow")), vec!["bare-except"]);
        assert!(scan("a.py", "except ValueError:").is_empty());
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = DebtConfig {
            max_line_length: 10,
            deep_indent: 2,
            ..Default::default()
        };
        let facts = FileFacts::new("a.js").with_source("  call(argument);");
        let items = DebtScanner::new(&config).scan_file(&facts);
        assert_eq!(kinds(&items), vec!["deep-nesting", "long-line"]);
    }

    #[test]
    fn test_disabled_scan() {
        let config = DebtConfig {
            enabled: false,
            ..Default::default()
        };
        let facts = FileFacts::new("a.py").with_source("eval(x)  # TODO");
        assert!(DebtScanner::new(&config).scan(&[&facts]).is_empty());
    }

    #[test]
    fn test_scan_keeps_file_order() {
        let config = DebtConfig::default();
        let a = FileFacts::new("a.py").with_source("eval(x)");
        let b = FileFacts::new("b.py").with_source("# TODO");
        let items = DebtScanner::new(&config).scan(&[&b, &a]);
        let files: Vec<_> = items.iter().map(|i| i.file.as_str()).collect();
        assert_eq!(files, vec!["b.py", "a.py"]);
    }

    mod summaries {
        use super::*;

        fn item(severity: Severity, effort: Effort) -> DebtItem {
            DebtItem {
                file: "a.py".into(),
                line: 1,
                kind: "test".into(),
                severity,
                category: DebtCategory::Maintainability,
                description: String::new(),
                suggestion: String::new(),
                effort,
            }
        }

        #[test]
        fn test_breakdown_and_distribution() {
            let items = vec![
                item(Severity::Critical, Effort::Days),
                item(Severity::Medium, Effort::Minutes),
                item(Severity::Medium, Effort::Hours),
                item(Severity::Low, Effort::Minutes),
            ];
            assert_eq!(
                severity_breakdown(&items),
                SeverityBreakdown { critical: 1, high: 0, medium: 2, low: 1 }
            );
            assert_eq!(
                effort_distribution(&items),
                EffortDistribution { minutes: 2, hours: 1, days: 1 }
            );
        }

        #[test]
        fn test_estimate_effort_units() {
            assert_eq!(estimate_effort(&[]), "0 hours");
            let hours: Vec<_> = (0..3).map(|_| item(Severity::Medium, Effort::Hours)).collect();
            assert_eq!(estimate_effort(&hours), "3 hours");
            let days: Vec<_> = (0..2).map(|_| item(Severity::Critical, Effort::Days)).collect();
            assert_eq!(estimate_effort(&days), "2 days");
            let weeks: Vec<_> = (0..10).map(|_| item(Severity::Critical, Effort::Days)).collect();
            assert_eq!(estimate_effort(&weeks), "2 weeks");
        }

        #[test]
        fn test_quick_wins_filter_and_limit() {
            let items = vec![
                item(Severity::Low, Effort::Minutes),
                item(Severity::Medium, Effort::Hours),
                item(Severity::Medium, Effort::Minutes),
                item(Severity::High, Effort::Minutes),
                item(Severity::Medium, Effort::Minutes),
            ];
            let wins = quick_wins(&items, 2);
            assert_eq!(wins.len(), 2);
            assert_eq!(wins[0].severity, Severity::Medium);
            assert_eq!(wins[1].severity, Severity::High);
        }
    }
}
