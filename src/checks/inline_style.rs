//! inline-style: `<style>` blocks inside a page

use crate::check::{Check, CheckContext, CheckResult};
use crate::config::ConfigError;
use crate::node::Node;
use crate::rule::{Rule, RuleCategory};
use crate::violation::Severity;

pub fn rule() -> Rule {
    Rule::new("inline-style", "Inline style should be avoided")
        .with_name("Inline Style")
        .with_severity(Severity::Info)
        .with_category(RuleCategory::Maintainability)
        .with_tag("css")
}

pub fn create(_rule: &Rule) -> Result<Box<dyn Check>, ConfigError> {
    Ok(Box::new(InlineStyle))
}

struct InlineStyle;

impl Check for InlineStyle {
    fn start_element(&mut self, element: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        if element.has_name("style") {
            ctx.report_node(element);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{lines, run};

    #[test]
    fn test_style_element_reported() {
        let content = "<html>\n<head>\n<STYLE>p { color: red }</STYLE>\n</head>\n<style></style>\n</html>";
        assert_eq!(lines(rule(), create, content), vec![3, 5]);
    }

    #[test]
    fn test_uses_rule_description() {
        let got = run(rule(), create, "<style/>");
        assert_eq!(got, vec![(1, "Inline style should be avoided".to_string())]);
    }

    #[test]
    fn test_style_attribute_is_not_an_element() {
        assert!(lines(rule(), create, "<p style=\"x\">styled</p>").is_empty());
    }
}
