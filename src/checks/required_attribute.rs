//! required-attribute: elements that must carry an attribute

use super::qualified_param;
use crate::check::{Check, CheckContext, CheckResult};
use crate::config::ConfigError;
use crate::node::Node;
use crate::qualified::QualifiedAttribute;
use crate::rule::{Rule, RuleCategory};

pub fn rule() -> Rule {
    Rule::new("required-attribute", "Required attribute is missing")
        .with_name("Required Attribute")
        .with_category(RuleCategory::Usability)
        .with_param("attributes", "img.alt")
        .with_tag("accessibility")
}

pub fn create(rule: &Rule) -> Result<Box<dyn Check>, ConfigError> {
    Ok(Box::new(RequiredAttribute {
        attributes: qualified_param(rule, "attributes")?,
    }))
}

struct RequiredAttribute {
    attributes: Vec<QualifiedAttribute>,
}

impl Check for RequiredAttribute {
    fn start_element(&mut self, element: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        for pattern in &self.attributes {
            if pattern.applies_to(element.name()) && !pattern.matches(element) {
                ctx.report_with_message(
                    element.start_line(),
                    format!(
                        "Required attribute '{}' is missing on <{}>",
                        pattern.attribute,
                        element.name()
                    ),
                );
            }
        }
        Ok(())
    }
}
