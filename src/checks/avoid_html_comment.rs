//! avoid-html-comment: HTML comments in JSP pages
//!
//! HTML comments are sent to the browser; in a JSP page a `<%-- --%>`
//! comment does the same job without leaking. Whether a page is a JSP page
//! is only known once it was fully seen, so comments are reported at the
//! end of the document.

use crate::check::{Check, CheckContext, CheckResult};
use crate::config::ConfigError;
use crate::node::Node;
use crate::rule::{Rule, RuleCategory};

pub fn rule() -> Rule {
    Rule::new(
        "avoid-html-comment",
        "HTML comment is sent to the client, use a JSP comment instead",
    )
    .with_name("Avoid HTML Comment")
    .with_category(RuleCategory::Security)
    .with_tag("jsp")
}

pub fn create(_rule: &Rule) -> Result<Box<dyn Check>, ConfigError> {
    Ok(Box::new(AvoidHtmlComment::default()))
}

#[derive(Default)]
struct AvoidHtmlComment {
    html_comments: Vec<usize>,
    is_jsp: bool,
}

impl Check for AvoidHtmlComment {
    fn start_document(&mut self, _root: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        self.html_comments.clear();
        self.is_jsp = false;
        Ok(())
    }

    fn start_element(&mut self, element: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        if element.name().starts_with("jsp:") {
            self.is_jsp = true;
        }
        Ok(())
    }

    fn comment(&mut self, comment: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        match comment.text_content() {
            Some(text) if text.starts_with("<%--") => self.is_jsp = true,
            Some(text) if text.starts_with("<!--") => {
                self.html_comments.push(comment.start_line())
            }
            _ => {}
        }
        Ok(())
    }

    fn directive(&mut self, directive: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        // `!DOCTYPE` and `?xml` are markup, not JSP
        if !directive.name().starts_with(['!', '?']) {
            self.is_jsp = true;
        }
        Ok(())
    }

    fn expression(&mut self, _expression: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        self.is_jsp = true;
        Ok(())
    }

    fn end_document(&mut self, _root: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        if self.is_jsp {
            for &line in &self.html_comments {
                ctx.report(line);
            }
        }
        Ok(())
    }
}
