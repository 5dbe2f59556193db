//! Qualified attributes: `element.attribute` patterns used by rule parameters
//!
//! A rule parameter such as `"a.onclick, img.alt, style"` parses into a list
//! of [`QualifiedAttribute`]. A bare token matches the attribute on any
//! element.

use crate::node::{Attribute, Node};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed qualified-attribute list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualifiedAttributeError {
    #[error("empty entry at position {position} in '{input}'")]
    EmptyToken { input: String, position: usize },

    #[error("missing attribute name in '{token}'")]
    EmptyAttribute { token: String },

    #[error("missing element name in '{token}'")]
    EmptyElement { token: String },

    #[error("whitespace inside name in '{token}'")]
    WhitespaceInName { token: String },
}

/// An attribute name, optionally scoped to an element name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedAttribute {
    /// Element name (None = any element)
    pub element: Option<String>,
    pub attribute: String,
}

impl QualifiedAttribute {
    pub fn new(element: Option<&str>, attribute: &str) -> Self {
        Self {
            element: element.map(String::from),
            attribute: attribute.to_string(),
        }
    }

    /// Whether `name` satisfies the element scope of this pattern
    pub fn applies_to(&self, name: &str) -> bool {
        self.element
            .as_deref()
            .is_none_or(|e| e.eq_ignore_ascii_case(name))
    }

    /// Find the attribute this pattern targets on `node`
    pub fn find<'n>(&self, node: &'n Node) -> Option<&'n Attribute> {
        if !node.is_element() || !self.applies_to(node.name()) {
            return None;
        }
        node.attribute(&self.attribute)
    }

    /// Whether `node` carries the attribute this pattern targets
    pub fn matches(&self, node: &Node) -> bool {
        self.find(node).is_some()
    }
}

impl FromStr for QualifiedAttribute {
    type Err = QualifiedAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let (element, attribute) = match token.split_once('.') {
            Some((element, attribute)) => (Some(element.trim()), attribute.trim()),
            None => (None, token),
        };

        if element.is_some_and(str::is_empty) {
            return Err(QualifiedAttributeError::EmptyElement {
                token: token.to_string(),
            });
        }
        if attribute.is_empty() {
            return Err(QualifiedAttributeError::EmptyAttribute {
                token: token.to_string(),
            });
        }
        if element
            .into_iter()
            .chain([attribute])
            .any(|name| name.contains(char::is_whitespace))
        {
            return Err(QualifiedAttributeError::WhitespaceInName {
                token: token.to_string(),
            });
        }
        Ok(Self::new(element, attribute))
    }
}

impl fmt::Display for QualifiedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(element) => write!(f, "{}.{}", element, self.attribute),
            None => write!(f, "{}", self.attribute),
        }
    }
}

/// Parse a comma-separated list of qualified attributes, preserving order
pub fn parse_qualified_attributes(
    input: &str,
) -> Result<Vec<QualifiedAttribute>, QualifiedAttributeError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .enumerate()
        .map(|(i, token)| {
            if token.trim().is_empty() {
                return Err(QualifiedAttributeError::EmptyToken {
                    input: input.to_string(),
                    position: i + 1,
                });
            }
            token.parse()
        })
        .collect()
}

/// Render qualified attributes back into their configuration form
pub fn render_qualified_attributes(attributes: &[QualifiedAttribute]) -> String {
    attributes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Whether any pattern in `patterns` matches `node`
pub fn match_any(patterns: &[QualifiedAttribute], node: &Node) -> bool {
    patterns.iter().any(|p| p.matches(node))
}
