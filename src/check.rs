//! The check contract every rule implements
//!
//! A check receives visitor callbacks for each node of a page and reports
//! violations through the [`CheckContext`] it is handed. Every callback has
//! a no-op default, so a rule only implements the events it cares about:
//!
//! ```
//! use pagelint::check::{Check, CheckContext, CheckResult};
//! use pagelint::Node;
//!
//! struct NoMarquee;
//!
//! impl Check for NoMarquee {
//!     fn start_element(&mut self, element: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
//!         if element.has_name("marquee") {
//!             ctx.report_node(element);
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::config::ConfigError;
use crate::node::Node;
use crate::rule::Rule;
use crate::violation::{Violation, ViolationSink};
use std::sync::Arc;

/// Result of a single callback; an error disables the check for the file
pub type CheckResult = anyhow::Result<()>;

/// Builds a check for a rule, reading its parameters
pub type CheckFactory = fn(&Rule) -> Result<Box<dyn Check>, ConfigError>;

/// Visitor callbacks for one rule
pub trait Check {
    fn start_document(&mut self, _root: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    fn end_document(&mut self, _root: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    fn start_element(&mut self, _element: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    /// Called after all children of `element` were visited
    fn end_element(&mut self, _element: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    fn characters(&mut self, _text: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    fn comment(&mut self, _comment: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    fn directive(&mut self, _directive: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }

    fn expression(&mut self, _expression: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        Ok(())
    }
}

/// Reporting surface bound to one rule and one file's sink
pub struct CheckContext<'a> {
    rule: &'a Arc<Rule>,
    sink: &'a mut ViolationSink,
}

impl<'a> CheckContext<'a> {
    pub fn new(rule: &'a Arc<Rule>, sink: &'a mut ViolationSink) -> Self {
        Self { rule, sink }
    }

    pub fn rule(&self) -> &Rule {
        self.rule
    }

    /// Report at `line` using the rule description as message
    pub fn report(&mut self, line: usize) {
        self.push(line, None);
    }

    /// Report at `line`; an empty message falls back to the rule description
    pub fn report_with_message(&mut self, line: usize, message: impl AsRef<str>) {
        self.push(line, Some(message.as_ref()));
    }

    /// Report at the start line of `node`
    pub fn report_node(&mut self, node: &Node) {
        self.report(node.start_line());
    }

    fn push(&mut self, line: usize, message: Option<&str>) {
        debug_assert!(line >= 1, "rule '{}' reported line 0", self.rule.id);
        self.sink
            .add(Violation::new(Arc::clone(self.rule), line, message));
    }
}
