//! Rule descriptors
//!
//! A [`Rule`] is the immutable metadata a check is bound to: identity,
//! description (the default violation message), severity and parameters.

use crate::violation::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Rule category for grouping related rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Markup that is hard to change or understand
    #[default]
    Maintainability,
    /// Markup that is likely to break at runtime
    Reliability,
    /// Markup that is unsafe
    Security,
    /// Markup that only works on some servers or browsers
    Portability,
    /// Markup that hurts accessibility or end users
    Usability,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Maintainability => write!(f, "maintainability"),
            RuleCategory::Reliability => write!(f, "reliability"),
            RuleCategory::Security => write!(f, "security"),
            RuleCategory::Portability => write!(f, "portability"),
            RuleCategory::Usability => write!(f, "usability"),
        }
    }
}

impl std::str::FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "maintainability" => Ok(RuleCategory::Maintainability),
            "reliability" => Ok(RuleCategory::Reliability),
            "security" => Ok(RuleCategory::Security),
            "portability" => Ok(RuleCategory::Portability),
            "usability" | "accessibility" => Ok(RuleCategory::Usability),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A lint rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier (e.g., "inline-style")
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub name: Option<String>,

    /// Static description, used as the message when a check supplies none
    pub description: String,

    /// Default severity level
    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub category: RuleCategory,

    /// String parameters with their default values
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Documentation URL
    #[serde(default)]
    pub docs: Option<String>,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this rule is enabled by default
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Rule {
    /// Create a new rule with minimal required fields
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            description: description.to_string(),
            severity: Severity::Warning,
            category: RuleCategory::default(),
            params: BTreeMap::new(),
            docs: None,
            tags: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }

    /// Declare a parameter and its default value
    pub fn with_param(mut self, key: &str, default: &str) -> Self {
        self.params.insert(key.to_string(), default.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_docs(mut self, url: &str) -> Self {
        self.docs = Some(url.to_string());
        self
    }

    /// Mark rule as opt-in
    pub fn disabled_by_default(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Value of a parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Title for display, falling back to the id
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
