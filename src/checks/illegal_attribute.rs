//! illegal-attribute: attributes that must not be used

use super::qualified_param;
use crate::check::{Check, CheckContext, CheckResult};
use crate::config::ConfigError;
use crate::node::Node;
use crate::qualified::QualifiedAttribute;
use crate::rule::{Rule, RuleCategory};

pub fn rule() -> Rule {
    Rule::new("illegal-attribute", "Attribute should not be used")
        .with_name("Illegal Attribute")
        .with_category(RuleCategory::Maintainability)
        .with_param("attributes", "style")
}

pub fn create(rule: &Rule) -> Result<Box<dyn Check>, ConfigError> {
    Ok(Box::new(IllegalAttribute {
        attributes: qualified_param(rule, "attributes")?,
    }))
}

struct IllegalAttribute {
    attributes: Vec<QualifiedAttribute>,
}

impl Check for IllegalAttribute {
    fn start_element(&mut self, element: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        for pattern in &self.attributes {
            if let Some(attr) = pattern.find(element) {
                ctx.report_with_message(
                    element.start_line(),
                    format!("Attribute '{}' on <{}> should not be used", attr.name, element.name()),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::run;

    #[test]
    fn test_default_flags_style_attribute() {
        let got = run(rule(), create, "<div>\n<p style=\"color: red\">x</p>\n</div>");
        assert_eq!(
            got,
            vec![(2, "Attribute 'style' on <p> should not be used".to_string())]
        );
    }

    #[test]
    fn test_qualified_entries_scope_to_element() {
        let rule = rule().with_param("attributes", "a.onclick, bgcolor");
        let content = "<a onclick=\"go()\">x</a>\n<div onclick=\"go()\" BGCOLOR=\"red\"></div>";
        let got = run(rule, create, content);
        assert_eq!(
            got,
            vec![
                (1, "Attribute 'onclick' on <a> should not be used".to_string()),
                (2, "Attribute 'BGCOLOR' on <div> should not be used".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_list_reports_nothing() {
        let rule = rule().with_param("attributes", "");
        assert!(run(rule, create, "<p style=\"x\"/>").is_empty());
    }

    #[test]
    fn test_malformed_list_is_config_error() {
        let rule = rule().with_param("attributes", "style,,id");
        assert!(matches!(
            create(&rule),
            Err(ConfigError::InvalidRule { .. })
        ));
    }
}
