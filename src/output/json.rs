//! JSON output formatter

use super::OutputFormatter;
use crate::engine::{LintResult, Suppression};
use crate::violation::{Severity, Violation};
use crate::visitor::CheckFailure;
use serde::Serialize;
use std::path::Path;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<JsonFile<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: String,
    violations: Vec<JsonViolation<'a>>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    failures: &'a [CheckFailure],
    suppressed: usize,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    suppressions: &'a [Suppression],
}

#[derive(Serialize)]
struct JsonViolation<'a> {
    rule_id: &'a str,
    severity: Severity,
    message: &'a str,
    file: String,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_line: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    docs: Option<&'a str>,
}

impl<'a> JsonViolation<'a> {
    fn new(path: &Path, violation: &'a Violation, source_line: Option<&'a str>) -> Self {
        Self {
            rule_id: violation.rule_id(),
            severity: violation.severity(),
            message: violation.message(),
            file: path.display().to_string(),
            line: violation.line(),
            source_line,
            docs: violation.rule().docs.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct JsonSummary {
    files_processed: usize,
    files_with_errors: usize,
    files_with_warnings: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    failure_count: usize,
    duration_ms: u128,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &LintResult) -> String {
        let files = result
            .files
            .iter()
            .map(|report| JsonFile {
                path: report.path.display().to_string(),
                violations: report
                    .violations
                    .iter()
                    .map(|v| JsonViolation::new(&report.path, v, report.snippet(v.line())))
                    .collect(),
                failures: &report.failures,
                suppressed: report.suppressed(),
                suppressions: &report.suppressions,
            })
            .collect();

        let output = JsonOutput {
            files,
            summary: JsonSummary {
                files_processed: result.files_processed,
                files_with_errors: result.files_with_errors,
                files_with_warnings: result.files_with_warnings,
                error_count: result.error_count,
                warning_count: result.warning_count,
                info_count: result.info_count,
                failure_count: result.failure_count,
                duration_ms: result.duration.as_millis(),
            },
        };

        self.to_json(&output)
    }

    fn format_violation(&self, path: &Path, violation: &Violation) -> String {
        self.to_json(&JsonViolation::new(path, violation, None))
    }
}
