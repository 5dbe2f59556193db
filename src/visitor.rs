//! Visitor dispatch: one pre-order walk of a page, all checks per node
//!
//! Checks never see each other. A check whose callback errors or panics is
//! recorded as a [`CheckFailure`] and skipped for the rest of the walk;
//! the remaining checks keep running.

use crate::check::{Check, CheckContext, CheckResult};
use crate::node::{Node, NodeKind};
use crate::rule::Rule;
use crate::violation::ViolationSink;
use serde::Serialize;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

thread_local! {
    static IN_CHECK: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside a check callback
///
/// A panic hook can use this to keep panics that [`walk`] already turns
/// into [`CheckFailure`]s off stderr.
pub fn in_check_callback() -> bool {
    IN_CHECK.with(Cell::get)
}

/// A check instance bound to its rule for one file
pub struct ActiveCheck {
    rule: Arc<Rule>,
    check: Box<dyn Check>,
    failed: bool,
}

impl ActiveCheck {
    pub fn new(rule: Arc<Rule>, check: Box<dyn Check>) -> Self {
        Self {
            rule,
            check,
            failed: false,
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Whether the check was disabled after a failure
    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

/// A check that stopped participating in a file's analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub rule_id: String,
    /// Start line of the node being visited when the check failed
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
enum Event {
    StartDocument,
    EndDocument,
    StartElement,
    EndElement,
    Characters,
    Comment,
    Directive,
    Expression,
}

impl Event {
    fn invoke(self, check: &mut dyn Check, node: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        match self {
            Event::StartDocument => check.start_document(node, ctx),
            Event::EndDocument => check.end_document(node, ctx),
            Event::StartElement => check.start_element(node, ctx),
            Event::EndElement => check.end_element(node, ctx),
            Event::Characters => check.characters(node, ctx),
            Event::Comment => check.comment(node, ctx),
            Event::Directive => check.directive(node, ctx),
            Event::Expression => check.expression(node, ctx),
        }
    }
}

/// Walk `root` once, dispatching every node to every active check
///
/// Returns the failures raised by checks during the walk, in the order
/// they happened.
pub fn walk(root: &Node, checks: &mut [ActiveCheck], sink: &mut ViolationSink) -> Vec<CheckFailure> {
    let mut walker = Walker {
        checks,
        sink,
        failures: Vec::new(),
    };

    walker.dispatch(Event::StartDocument, root);
    walker.visit(root);
    walker.dispatch(Event::EndDocument, root);

    walker.failures
}

struct Walker<'a> {
    checks: &'a mut [ActiveCheck],
    sink: &'a mut ViolationSink,
    failures: Vec<CheckFailure>,
}

impl Walker<'_> {
    /// Visit `root` and its subtree using a heap stack instead of recursion
    fn visit(&mut self, root: &Node) {
        // Open nodes with the index of their next child to visit
        let mut stack: Vec<(&Node, usize)> = Vec::new();
        self.enter(root, &mut stack);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            match node.children().get(frame.1) {
                Some(child) => {
                    frame.1 += 1;
                    self.enter(child, &mut stack);
                }
                None => {
                    stack.pop();
                    if node.is_element() {
                        self.dispatch(Event::EndElement, node);
                    }
                }
            }
        }
    }

    fn enter<'n>(&mut self, node: &'n Node, stack: &mut Vec<(&'n Node, usize)>) {
        match node.kind() {
            NodeKind::Element => {
                self.dispatch(Event::StartElement, node);
                stack.push((node, 0));
            }
            NodeKind::Document => stack.push((node, 0)),
            NodeKind::Text => self.dispatch(Event::Characters, node),
            NodeKind::Comment => self.dispatch(Event::Comment, node),
            NodeKind::Directive => self.dispatch(Event::Directive, node),
            NodeKind::Expression => self.dispatch(Event::Expression, node),
        }
    }

    fn dispatch(&mut self, event: Event, node: &Node) {
        let Walker {
            checks,
            sink,
            failures,
        } = self;

        for active in checks.iter_mut().filter(|c| !c.failed) {
            let outcome = {
                let mut ctx = CheckContext::new(&active.rule, &mut **sink);
                let check = active.check.as_mut();
                IN_CHECK.with(|flag| flag.set(true));
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| event.invoke(check, node, &mut ctx)));
                IN_CHECK.with(|flag| flag.set(false));
                outcome
            };

            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{:#}", err),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            active.failed = true;
            failures.push(CheckFailure {
                rule_id: active.rule.id.clone(),
                line: node.start_line(),
                message,
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
