//! pagelint - rule-based static analysis for HTML and JSP pages
//!
//! A page is parsed into a tree of [`Node`]s, then walked once in document
//! order. Every node is dispatched to every configured [`Check`]; checks
//! report [`Violation`]s by line through the context they are handed.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> CheckRegistry -> Check -> Page
//! ```
//!
//! The engine loads configuration, resolves the enabled rules and their
//! parameters, lints pages in parallel and collects one report per page.
//!
//! # Configuring Rules
//!
//! Rule parameters are set in `.pagelintrc.yaml`:
//!
//! ```yaml
//! rules:
//!   disabled: [avoid-html-comment]
//!   severity:
//!     required-attribute: error
//!   params:
//!     required-attribute:
//!       attributes: "img.alt, area.alt, input.type"
//! ```

pub mod check;
pub mod checks;
pub mod config;
pub mod discover;
pub mod document;
pub mod engine;
pub mod node;
pub mod output;
pub mod parser;
pub mod qualified;
pub mod registry;
pub mod rule;
pub mod violation;
pub mod visitor;

// Re-export main types
pub use check::{Check, CheckContext, CheckFactory, CheckResult};
pub use config::{Config, ConfigError, Overrides};
pub use document::PageDocument;
pub use engine::{Engine, FileReport, LintResult, Suppression};
pub use node::{Attribute, Node, NodeKind};
pub use output::{CompactFormatter, JsonFormatter, OutputFormatter, TextFormatter};
pub use parser::{parse_page, ParseError};
pub use qualified::{
    parse_qualified_attributes, render_qualified_attributes, QualifiedAttribute,
    QualifiedAttributeError,
};
pub use registry::{CheckRegistry, CheckSet};
pub use rule::{Rule, RuleCategory};
pub use violation::{Severity, Violation, ViolationSink};
pub use visitor::{in_check_callback, walk, ActiveCheck, CheckFailure};
