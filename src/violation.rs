//! Violations and the per-file violation sink

use crate::rule::Rule;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Severity level for violations
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite problem
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "minor" => Ok(Severity::Info),
            "warning" | "warn" | "major" => Ok(Severity::Warning),
            "error" | "err" | "critical" | "blocker" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// A single finding: one rule, one line, one message
#[derive(Debug, Clone)]
pub struct Violation {
    rule: Arc<Rule>,
    line: usize,
    message: String,
}

impl Violation {
    /// Create a violation; an empty message falls back to the rule
    /// description, then to the rule id, so the message is never empty
    pub fn new(rule: Arc<Rule>, line: usize, message: Option<&str>) -> Self {
        let message = [message.unwrap_or_default(), rule.description.as_str()]
            .into_iter()
            .find(|m| !m.trim().is_empty())
            .unwrap_or(rule.id.as_str())
            .to_string();
        Self {
            rule,
            line,
            message,
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn rule_id(&self) -> &str {
        &self.rule.id
    }

    pub fn severity(&self) -> Severity {
        self.rule.severity
    }

    /// Line number (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Append-only collection of the violations found in one file
#[derive(Debug, Default)]
pub struct ViolationSink {
    violations: Vec<Violation>,
}

impl ViolationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Recorded violations in insertion order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}
