//! Compact output formatter
//!
//! One line per violation, minimal output for scripting.

use super::OutputFormatter;
use crate::engine::LintResult;
use crate::violation::Violation;
use std::path::Path;

/// Compact one-line-per-violation formatter
pub struct CompactFormatter {
    /// Show severity prefix
    pub show_severity: bool,
    /// Show rule ID
    pub show_rule: bool,
}

impl CompactFormatter {
    /// Create a new compact formatter
    pub fn new() -> Self {
        Self {
            show_severity: true,
            show_rule: true,
        }
    }

    /// Hide severity prefix
    pub fn without_severity(mut self) -> Self {
        self.show_severity = false;
        self
    }

    /// Hide rule ID
    pub fn without_rule(mut self) -> Self {
        self.show_rule = false;
        self
    }
}

impl Default for CompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for CompactFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for report in &result.files {
            for violation in &report.violations {
                output.push_str(&self.format_violation(&report.path, violation));
                output.push('\n');
            }
            for failure in &report.failures {
                output.push_str(&format!(
                    "{}:{}: failure: {}: {}\n",
                    report.path.display(),
                    failure.line,
                    failure.rule_id,
                    failure.message
                ));
            }
        }

        output
    }

    fn format_violation(&self, path: &Path, violation: &Violation) -> String {
        let mut parts = vec![format!("{}:{}", path.display(), violation.line())];

        if self.show_severity {
            parts.push(violation.severity().to_string());
        }

        if self.show_rule {
            parts.push(violation.rule_id().to_string());
        }

        parts.push(violation.message().to_string());

        parts.join(": ")
    }
}
