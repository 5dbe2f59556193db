//! Built-in checks

mod avoid_html_comment;
mod dynamic_jsp_include;
mod illegal_attribute;
mod inline_style;
mod required_attribute;

use crate::config::ConfigError;
use crate::qualified::{parse_qualified_attributes, QualifiedAttribute};
use crate::registry::CheckRegistry;
use crate::rule::Rule;

/// Register every built-in rule with its factory
pub fn register_builtin(registry: &mut CheckRegistry) {
    registry.register(inline_style::rule(), inline_style::create);
    registry.register(illegal_attribute::rule(), illegal_attribute::create);
    registry.register(required_attribute::rule(), required_attribute::create);
    registry.register(avoid_html_comment::rule(), avoid_html_comment::create);
    registry.register(dynamic_jsp_include::rule(), dynamic_jsp_include::create);
}

/// Read a qualified-attribute list parameter of `rule`
fn qualified_param(rule: &Rule, key: &str) -> Result<Vec<QualifiedAttribute>, ConfigError> {
    parse_qualified_attributes(rule.param(key).unwrap_or_default()).map_err(|source| {
        ConfigError::InvalidRule {
            rule: rule.id.clone(),
            source,
        }
    })
}
