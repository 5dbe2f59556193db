//! Rule registry: rule ids mapped to their descriptors and check factories

use crate::check::CheckFactory;
use crate::checks;
use crate::config::{Config, ConfigError};
use crate::rule::Rule;
use crate::visitor::ActiveCheck;
use std::collections::HashMap;
use std::sync::Arc;

struct Registration {
    rule: Rule,
    factory: CheckFactory,
}

/// All known rules, in registration order
#[derive(Default)]
pub struct CheckRegistry {
    entries: Vec<Registration>,
    index: HashMap<String, usize>,
}

impl CheckRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule
    pub fn with_builtin_checks() -> Self {
        let mut registry = Self::new();
        checks::register_builtin(&mut registry);
        registry
    }

    /// Register a rule; a second registration of the same id replaces the first
    pub fn register(&mut self, rule: Rule, factory: CheckFactory) {
        if rule.description.trim().is_empty() {
            log::warn!("Rule '{}' has no description, messages fall back to its id", rule.id);
        }
        match self.index.get(&rule.id) {
            Some(&i) => {
                log::warn!("Rule '{}' registered twice, keeping the last", rule.id);
                self.entries[i] = Registration { rule, factory };
            }
            None => {
                self.index.insert(rule.id.clone(), self.entries.len());
                self.entries.push(Registration { rule, factory });
            }
        }
    }

    /// Get a rule by id
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.index.get(id).map(|&i| &self.entries[i].rule)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All registered rules
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.entries.iter().map(|e| &e.rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the rules that run under `config`
    ///
    /// Applies enablement, severity and parameter overrides, then builds
    /// every selected check once so a bad parameter fails here rather than
    /// in the middle of a lint run.
    pub fn configure(&self, config: &Config) -> Result<CheckSet, ConfigError> {
        self.warn_unknown_ids(config);

        let mut entries = Vec::new();
        for entry in &self.entries {
            let id = entry.rule.id.as_str();
            if !config.is_rule_enabled(id, entry.rule.enabled) {
                log::debug!("Rule '{}' is disabled", id);
                continue;
            }

            let mut rule = entry.rule.clone();
            if let Some(severity) = config.get_severity_override(id) {
                rule.severity = severity;
            }
            if let Some(params) = config.rule_params(id) {
                for (key, value) in params {
                    if !rule.params.contains_key(key) {
                        return Err(ConfigError::UnknownParameter {
                            rule: id.to_string(),
                            param: key.clone(),
                        });
                    }
                    rule.params.insert(key.clone(), value.clone());
                }
            }

            (entry.factory)(&rule)?;
            entries.push((Arc::new(rule), entry.factory));
        }

        Ok(CheckSet { entries })
    }

    fn warn_unknown_ids(&self, config: &Config) {
        let rules = &config.rules;
        let named = rules
            .disabled
            .iter()
            .chain(rules.enabled.iter())
            .chain(rules.severity.keys())
            .chain(rules.params.keys());
        for id in named {
            if !self.contains(id) {
                log::warn!("Configuration names unknown rule '{}'", id);
            }
        }
    }
}

/// The configured rules of a lint run
#[derive(Clone)]
pub struct CheckSet {
    entries: Vec<(Arc<Rule>, CheckFactory)>,
}

impl CheckSet {
    /// Fresh check instances for one file
    pub fn instantiate(&self) -> Result<Vec<ActiveCheck>, ConfigError> {
        self.entries
            .iter()
            .map(|(rule, factory)| Ok(ActiveCheck::new(Arc::clone(rule), factory(rule)?)))
            .collect()
    }

    /// Configured rules, with overrides applied
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.entries.iter().map(|(rule, _)| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
