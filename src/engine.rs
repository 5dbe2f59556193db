//! Lint engine: runs the configured checks over pages

use crate::config::{Config, ConfigError};
use crate::document::PageDocument;
use crate::parser::ParseError;
use crate::registry::{CheckRegistry, CheckSet};
use crate::rule::Rule;
use crate::violation::{Severity, Violation, ViolationSink};
use crate::visitor::{walk, CheckFailure};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rule id of the violation reported for a page that cannot be read or parsed
pub const PARSE_ERROR_RULE: &str = "parse-error";

/// A violation dropped by an inline or per-file suppression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suppression {
    pub rule_id: String,
    pub line: usize,
    /// Text after `:` or ` -- ` in the disable comment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Findings for one page
#[derive(Debug, Clone, Default)]
pub struct FileReport {
    pub path: PathBuf,

    /// Violations in the order checks reported them
    pub violations: Vec<Violation>,

    /// Checks that stopped early on this page
    pub failures: Vec<CheckFailure>,

    /// Violations dropped by inline or per-file suppressions
    pub suppressions: Vec<Suppression>,

    /// Source text of the lines that have violations
    pub snippets: BTreeMap<usize, String>,
}

impl FileReport {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    /// Source text of `line`, if it has a violation
    pub fn snippet(&self, line: usize) -> Option<&str> {
        self.snippets.get(&line).map(String::as_str)
    }

    /// Report for a page that never reached the checks
    fn unreadable(path: &Path, error: &ParseError) -> Self {
        let line = match error {
            ParseError::Markup { line, .. } => *line,
            ParseError::Io(_) => 1,
        };
        let rule = Arc::new(
            Rule::new(PARSE_ERROR_RULE, "Page could not be parsed").with_severity(Severity::Error),
        );
        let message = error.to_string();
        Self {
            violations: vec![Violation::new(rule, line.max(1), Some(message.as_str()))],
            ..Self::new(path)
        }
    }

    /// Number of suppressed violations
    pub fn suppressed(&self) -> usize {
        self.suppressions.len()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity() == severity)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures.is_empty()
    }
}

/// Result of linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// One report per page, in input order
    pub files: Vec<FileReport>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Total check failures
    pub failure_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl LintResult {
    /// Result holding a single page report
    pub fn from_report(report: FileReport) -> Self {
        let error_count = report.count(Severity::Error);
        let warning_count = report.count(Severity::Warning);
        Self {
            files_processed: 1,
            files_with_errors: usize::from(error_count > 0),
            files_with_warnings: usize::from(warning_count > 0),
            error_count,
            warning_count,
            info_count: report.count(Severity::Info),
            failure_count: report.failures.len(),
            files: vec![report],
            duration: Duration::ZERO,
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors, warnings or failures)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0 && self.failure_count == 0
    }

    /// Total number of violations
    pub fn violation_count(&self) -> usize {
        self.error_count + self.warning_count + self.info_count
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors or failed checks)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 || self.failure_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.files.extend(other.files);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
        self.failure_count += other.failure_count;
    }
}

/// The page lint engine
pub struct Engine {
    config: Config,
    checks: CheckSet,
}

impl Engine {
    /// Create an engine running the rules of `registry` selected by `config`
    ///
    /// Fails before any page is read if a rule is misconfigured.
    pub fn new(config: Config, registry: &CheckRegistry) -> Result<Self, ConfigError> {
        let checks = registry.configure(&config)?;
        log::debug!("{} of {} rules enabled", checks.len(), registry.len());
        Ok(Self { config, checks })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configured rules
    pub fn checks(&self) -> &CheckSet {
        &self.checks
    }

    /// Lint multiple files
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let reports: Vec<FileReport> = if self.config.engine.parallel && files.len() > 1 {
            let jobs = if self.config.engine.jobs > 0 {
                self.config.engine.jobs
            } else {
                num_cpus::get()
            };
            match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => pool.install(|| files.par_iter().map(|f| self.lint_file(f)).collect()),
                Err(e) => {
                    log::warn!("Falling back to sequential linting: {}", e);
                    files.iter().map(|f| self.lint_file(f)).collect()
                }
            }
        } else {
            files.iter().map(|f| self.lint_file(f)).collect()
        };

        let mut combined = LintResult::default();
        for report in reports {
            combined.merge(LintResult::from_report(report));
        }

        combined.duration = start.elapsed();
        combined
    }

    /// Lint a single file
    pub fn lint_file(&self, path: &Path) -> FileReport {
        match PageDocument::read(path) {
            Ok(document) => self.lint_document(&document),
            Err(e) => {
                log::debug!("Cannot lint {}: {}", path.display(), e);
                FileReport::unreadable(path, &e)
            }
        }
    }

    /// Lint page content that is already in memory
    pub fn lint_source(&self, content: &str, path: &Path) -> FileReport {
        match PageDocument::parse(content, path) {
            Ok(document) => self.lint_document(&document),
            Err(e) => FileReport::unreadable(path, &e),
        }
    }

    /// Run every configured check over a parsed page
    pub fn lint_document(&self, document: &PageDocument) -> FileReport {
        let path = document.path();
        let mut report = FileReport::new(path);

        let mut checks = match self.checks.instantiate() {
            Ok(checks) => checks,
            Err(e) => {
                // configure() built every check once, so this is a bug in a factory
                log::error!("Cannot create checks for {}: {}", path.display(), e);
                report.failures.push(CheckFailure {
                    rule_id: String::new(),
                    line: 1,
                    message: e.to_string(),
                });
                return report;
            }
        };

        let mut sink = ViolationSink::new();
        report.failures = walk(document.root(), &mut checks, &mut sink);

        for failure in &report.failures {
            log::error!(
                "Check '{}' failed at {}:{}: {}",
                failure.rule_id,
                path.display(),
                failure.line,
                failure.message
            );
        }

        for violation in sink.into_violations() {
            if let Some(suppression) = self.suppression(document, &violation) {
                report.suppressions.push(suppression);
            } else {
                if let Some(source) = document.source_line(violation.line()) {
                    report
                        .snippets
                        .entry(violation.line())
                        .or_insert_with(|| source.to_string());
                }
                report.violations.push(violation);
            }
        }

        report
    }

    fn suppression(&self, document: &PageDocument, violation: &Violation) -> Option<Suppression> {
        let rule_id = violation.rule_id();
        let line = violation.line();
        let suppressed = self
            .config
            .should_ignore_rule_for_file(rule_id, document.path())
            || document.is_rule_disabled_for_file(rule_id)
            || document.is_rule_disabled(rule_id, line);

        suppressed.then(|| Suppression {
            rule_id: rule_id.to_string(),
            line,
            reason: document.get_disable_reason(rule_id, line).map(String::from),
        })
    }
}
