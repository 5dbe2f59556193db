//! Output formatters for lint results

mod compact;
mod json;
mod text;

pub use compact::CompactFormatter;
pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::config::{OutputConfig, OutputFormat};
use crate::engine::LintResult;
use crate::violation::Violation;
use std::path::Path;

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire lint result
    fn format(&self, result: &LintResult) -> String;

    /// Format a single violation found in `path`
    fn format_violation(&self, path: &Path, violation: &Violation) -> String;
}

/// Formatter for the configured output settings
pub fn formatter_for(output: &OutputConfig, colored: bool) -> Box<dyn OutputFormatter> {
    match output.format {
        OutputFormat::Text => {
            let mut formatter = TextFormatter::new();
            if !colored {
                formatter = formatter.without_color();
            }
            if !output.statistics {
                formatter = formatter.without_stats();
            }
            if output.verbose {
                formatter = formatter.with_clean_files();
            }
            Box::new(formatter)
        }
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Compact => Box::new(CompactFormatter::new()),
    }
}

/// "1 error", "2 errors"
fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::engine::{FileReport, LintResult, Suppression};
    use crate::rule::Rule;
    use crate::violation::{Severity, Violation};
    use crate::visitor::CheckFailure;
    use std::path::Path;
    use std::sync::Arc;

    pub fn violation(id: &str, severity: Severity, line: usize, message: &str) -> Violation {
        let rule = Arc::new(Rule::new(id, "Rule description").with_severity(severity));
        Violation::new(rule, line, Some(message))
    }

    /// A result with two pages: one with findings, one clean
    pub fn sample_result() -> LintResult {
        let mut dirty = FileReport::new(Path::new("web/index.jsp"));
        dirty.violations = vec![
            violation("inline-style", Severity::Info, 3, "Inline style should be avoided"),
            violation("required-attribute", Severity::Warning, 7, "Required attribute 'alt' is missing on <img>"),
        ];
        dirty.snippets.insert(7, "  <img src=\"logo.png\">".to_string());
        dirty.suppressions = vec![
            Suppression {
                rule_id: "inline-style".to_string(),
                line: 5,
                reason: Some("generated markup".to_string()),
            },
            Suppression {
                rule_id: "illegal-attribute".to_string(),
                line: 8,
                reason: None,
            },
        ];
        dirty.failures = vec![CheckFailure {
            rule_id: "custom".to_string(),
            line: 9,
            message: "boom".to_string(),
        }];

        let mut result = LintResult::from_report(dirty);
        result.merge(LintResult::from_report(FileReport::new(Path::new("web/clean.html"))));
        result
    }
}
