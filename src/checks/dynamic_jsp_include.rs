//! dynamic-jsp-include: page includes resolved outside the component model

use crate::check::{Check, CheckContext, CheckResult};
use crate::config::ConfigError;
use crate::node::Node;
use crate::rule::{Rule, RuleCategory};

const DEFAULT_DIRECTIVE_MESSAGE: &str =
    "Include directive inlines the page at compile time, use a tag file instead";

pub fn rule() -> Rule {
    Rule::new(
        "dynamic-jsp-include",
        "Dynamic <jsp:include> should be avoided, use a tag file instead",
    )
    .with_name("Dynamic JSP Include")
    .with_category(RuleCategory::Reliability)
    .with_param("directive_message", DEFAULT_DIRECTIVE_MESSAGE)
    .with_tag("jsp")
}

pub fn create(rule: &Rule) -> Result<Box<dyn Check>, ConfigError> {
    Ok(Box::new(DynamicJspInclude {
        directive_message: rule
            .param("directive_message")
            .unwrap_or(DEFAULT_DIRECTIVE_MESSAGE)
            .to_string(),
    }))
}

struct DynamicJspInclude {
    directive_message: String,
}

impl Check for DynamicJspInclude {
    fn start_element(&mut self, element: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        if element.has_name("jsp:include") {
            ctx.report_node(element);
        }
        Ok(())
    }

    fn directive(&mut self, directive: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        if directive.has_name("include") {
            ctx.report_with_message(directive.start_line(), &self.directive_message);
        }
        Ok(())
    }
}
