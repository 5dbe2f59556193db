//! Human-readable text output formatter

use super::{plural, OutputFormatter};
use crate::engine::{FileReport, LintResult};
use crate::violation::{Severity, Violation};
use colored::*;
use std::path::Path;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line
    pub show_source: bool,

    /// Show statistics
    pub show_stats: bool,

    /// List pages without findings too
    pub show_clean: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_stats: true,
            show_clean: false,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Hide the summary line
    pub fn without_stats(mut self) -> Self {
        self.show_stats = false;
        self
    }

    /// List pages without findings too
    pub fn with_clean_files(mut self) -> Self {
        self.show_clean = true;
        self
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.colored {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_str(&self, severity: Severity) -> String {
        let s = severity.to_string();
        if !self.colored {
            return s;
        }
        match severity {
            Severity::Error => s.red().bold().to_string(),
            Severity::Warning => s.yellow().bold().to_string(),
            Severity::Info => s.blue().to_string(),
        }
    }

    fn format_report(&self, report: &FileReport) -> String {
        let mut output = String::new();
        output.push_str(&self.paint(&report.path.display().to_string(), |s| s.underline()));
        output.push('\n');

        for violation in &report.violations {
            output.push_str(&self.format_violation(&report.path, violation));
            if self.show_source {
                if let Some(source) = report.snippet(violation.line()) {
                    output.push_str(&format!(
                        "{} {} {}\n",
                        self.paint(&format!("{:>4}", violation.line()), |s| s.blue()),
                        self.paint("|", |s| s.blue()),
                        source
                    ));
                }
            }
        }

        for failure in &report.failures {
            output.push_str(&format!(
                "{}:{}: {}[{}]: check stopped: {}\n",
                report.path.display(),
                failure.line,
                self.paint("failure", |s| s.magenta().bold()),
                failure.rule_id,
                failure.message
            ));
        }

        if report.suppressed() > 0 {
            output.push_str(&format!(
                "   {} {} suppressed\n",
                self.paint("=", |s| s.blue()),
                plural(report.suppressed(), "violation")
            ));
        }
        for suppression in &report.suppressions {
            if let Some(reason) = &suppression.reason {
                output.push_str(&format!(
                    "     {}:{}: {}\n",
                    suppression.rule_id,
                    suppression.line,
                    self.paint(reason, |s| s.dimmed())
                ));
            }
        }

        output
    }

    fn format_stats(&self, result: &LintResult) -> String {
        let mut output = format!(
            "\n{} processed",
            plural(result.files_processed, "file")
        );

        let mut counts = Vec::new();
        if result.error_count > 0 {
            counts.push(self.paint(&plural(result.error_count, "error"), |s| s.red()));
        }
        if result.warning_count > 0 {
            counts.push(self.paint(&plural(result.warning_count, "warning"), |s| s.yellow()));
        }
        if result.info_count > 0 {
            counts.push(self.paint(&plural(result.info_count, "info"), |s| s.blue()));
        }
        if result.failure_count > 0 {
            counts.push(self.paint(&plural(result.failure_count, "failed check"), |s| {
                s.magenta()
            }));
        }

        if !counts.is_empty() {
            output.push_str(&format!(": {}", counts.join(", ")));
        }
        output.push('\n');

        output.push_str(&format!(
            "Finished in {:.2}s\n",
            result.duration.as_secs_f64()
        ));
        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for report in &result.files {
            if report.is_clean() && report.suppressed() == 0 && !self.show_clean {
                continue;
            }
            output.push_str(&self.format_report(report));
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&self.format_stats(result));
        }

        output
    }

    fn format_violation(&self, path: &Path, violation: &Violation) -> String {
        format!(
            "{}:{}: {}[{}]: {}\n",
            path.display(),
            violation.line(),
            self.severity_str(violation.severity()),
            self.paint(violation.rule_id(), |s| s.cyan()),
            violation.message()
        )
    }
}
