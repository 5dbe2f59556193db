//! Node model for parsed pages
//!
//! A page is a tree of [`Node`] values rooted at a single `Document` node.
//! Nodes are built once by the parser and never mutated afterwards.

use std::fmt;

/// Kind of a node in the page tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The synthetic root of a page
    Document,
    /// A markup tag, e.g. `<div class="x">`
    Element,
    /// Character data between tags
    Text,
    /// `<!-- ... -->` or `<%-- ... --%>`
    Comment,
    /// `<%@ ... %>`, `<!DOCTYPE ...>`, `<?xml ...?>`
    Directive,
    /// `<%= ... %>` or a `<% ... %>` scriptlet
    Expression,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Document => write!(f, "document"),
            NodeKind::Element => write!(f, "element"),
            NodeKind::Text => write!(f, "text"),
            NodeKind::Comment => write!(f, "comment"),
            NodeKind::Directive => write!(f, "directive"),
            NodeKind::Expression => write!(f, "expression"),
        }
    }
}

/// A name/value attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// A node in the page tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
    text: Option<String>,
    start_line: usize,
    end_line: usize,
}

impl Node {
    fn new(kind: NodeKind, name: &str, text: Option<&str>, line: usize) -> Self {
        Self {
            kind,
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: text.map(String::from),
            start_line: line,
            end_line: line,
        }
    }

    /// Create the root node of a page
    pub fn document() -> Self {
        Self::new(NodeKind::Document, "#document", None, 1)
    }

    pub fn element(name: &str, line: usize) -> Self {
        Self::new(NodeKind::Element, name, None, line)
    }

    pub fn text(content: &str, line: usize) -> Self {
        Self::new(NodeKind::Text, "#text", Some(content), line)
    }

    pub fn comment(content: &str, line: usize) -> Self {
        Self::new(NodeKind::Comment, "#comment", Some(content), line)
    }

    pub fn directive(name: &str, content: &str, line: usize) -> Self {
        Self::new(NodeKind::Directive, name, Some(content), line)
    }

    pub fn expression(content: &str, line: usize) -> Self {
        Self::new(NodeKind::Expression, "#expression", Some(content), line)
    }

    /// Set the last line covered by this node (clamped to the start line)
    pub fn with_end_line(mut self, line: usize) -> Self {
        self.set_end_line(line);
        self
    }

    pub(crate) fn set_end_line(&mut self, line: usize) {
        self.end_line = line.max(self.start_line);
    }

    /// Add an attribute; a repeated name keeps the first value
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.push_attribute(name, value);
        self
    }

    pub(crate) fn push_attribute(&mut self, name: &str, value: &str) {
        if self.attribute(name).is_none() {
            self.attributes.push(Attribute::new(name, value));
        }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Element name, or a `#`-prefixed pseudo name for other kinds
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Raw source text for text, comment, directive and expression nodes
    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// ASCII case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Look up an attribute by name (ASCII case-insensitive)
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Attribute value by name (ASCII case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_str())
    }

    /// Iterate over this node and all its descendants in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

impl Drop for Node {
    // Flatten the subtree first so deep pages do not recurse on drop
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_deep_tree() {
        let mut node = Node::element("div", 1);
        for line in 2..=200_000 {
            node = Node::element("div", line).with_child(node);
        }
        let root = Node::document().with_child(node);
        assert_eq!(root.descendants().count(), 200_001);
        drop(root);
    }

    fn sample() -> Node {
        Node::document().with_child(
            Node::element("html", 1)
                .with_child(Node::element("head", 2).with_child(Node::element("style", 3)))
                .with_child(Node::text("hello", 5))
                .with_end_line(6),
        )
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let node = Node::element("div", 1).with_attribute("Class", "big");
        assert_eq!(node.get("class"), Some("big"));
        assert_eq!(node.get("CLASS"), Some("big"));
        assert!(node.attribute("id").is_none());
    }

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        let node = Node::element("div", 1)
            .with_attribute("id", "a")
            .with_attribute("ID", "b");
        assert_eq!(node.attributes().len(), 1);
        assert_eq!(node.get("id"), Some("a"));
    }

    #[test]
    fn test_attribute_order_preserved() {
        let node = Node::element("a", 1)
            .with_attribute("href", "#")
            .with_attribute("title", "t")
            .with_attribute("class", "c");
        let names: Vec<_> = node.attributes().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["href", "title", "class"]);
    }

    #[test]
    fn test_end_line_never_before_start() {
        let node = Node::element("p", 4).with_end_line(2);
        assert_eq!(node.end_line(), 4);
    }

    #[test]
    fn test_descendants_pre_order() {
        let root = sample();
        let names: Vec<_> = root.descendants().map(|n| n.name()).collect();
        assert_eq!(
            names,
            vec!["#document", "html", "head", "style", "#text"]
        );
    }

    #[test]
    fn test_has_name() {
        let node = Node::element("STYLE", 1);
        assert!(node.has_name("style"));
        assert!(!node.has_name("script"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(NodeKind::Element.to_string(), "element");
        assert_eq!(NodeKind::Directive.to_string(), "directive");
    }
}
