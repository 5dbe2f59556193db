//! Lenient markup parser for HTML and JSP pages
//!
//! Pages are read with `quick-xml` in a relaxed configuration: end tag names
//! are not checked, unmatched end tags are allowed and entities are left
//! as-is. On top of the XML events the tree builder knows about HTML void
//! elements and raw-text elements (`script`, `style`). JSP constructs
//! (`<%@ %>`, `<%= %>`, `<% %>`, `<%-- --%>`) are cut out of the input
//! before the reader sees them, since their bodies are not markup.

use crate::node::Node;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Error during parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Markup parse error at line {line}: {message}")]
    Markup { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Elements that never have content or an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is not markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Byte offset to 1-based line number
struct LineIndex {
    starts: Vec<usize>,
    last_line: usize,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            starts,
            last_line: content.lines().count().max(1),
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).max(1)
    }

    /// Line of the last byte in `start..end`
    fn last_line_of(&self, start: usize, end: usize) -> usize {
        self.line_at(end.saturating_sub(1).max(start))
    }
}

/// Stack of open elements; index 0 is the document root
struct TreeBuilder {
    stack: Vec<Node>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Node::document()],
        }
    }

    fn add(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_child(node);
        }
    }

    fn open(&mut self, node: Node) {
        self.stack.push(node);
    }

    /// Close the nearest open element named `name`, and any opened after it
    fn close(&mut self, name: &str, line: usize) {
        let Some(pos) = self
            .stack
            .iter()
            .rposition(|n| n.is_element() && n.has_name(name))
        else {
            log::debug!("Ignoring unmatched end tag </{}> at line {}", name, line);
            return;
        };

        while self.stack.len() > pos {
            if let Some(mut node) = self.stack.pop() {
                node.set_end_line(line);
                self.add(node);
            }
        }
    }

    fn finish(mut self, last_line: usize) -> Node {
        while self.stack.len() > 1 {
            if let Some(mut node) = self.stack.pop() {
                node.set_end_line(last_line);
                self.add(node);
            }
        }
        self.stack
            .pop()
            .unwrap_or_else(Node::document)
            .with_end_line(last_line)
    }
}

fn reader_at(content: &str, offset: usize) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(content.get(offset..).unwrap_or_default());
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    reader
}

/// Offset of the `<` opening the markup event read from `start`
///
/// Depending on the preceding event the reader may already have consumed
/// the `<`.
fn markup_start(content: &str, start: usize) -> usize {
    if content.as_bytes().get(start) == Some(&b'<') {
        start
    } else {
        start.saturating_sub(1)
    }
}

fn slice(content: &str, start: usize, end: usize) -> &str {
    content.get(start..end).unwrap_or_default()
}

fn element(e: &BytesStart<'_>, line: usize) -> Node {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = Node::element(&name, line);

    let mut attributes = e.html_attributes();
    attributes.with_checks(false);
    for attr in attributes.flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let value = String::from_utf8_lossy(&attr.value);
        node.push_attribute(&key, &value);
    }

    node
}

/// Offset of a JSP construct beginning at the reader position `start`
fn jsp_start(content: &str, start: usize) -> Option<usize> {
    let rest = content.get(start..)?;
    if rest.starts_with("<%") {
        Some(start)
    } else if rest.starts_with('%') && start > 0 && content.as_bytes()[start - 1] == b'<' {
        Some(start - 1)
    } else {
        None
    }
}

/// End offset of a JSP construct starting at `start`, if terminated
fn jsp_end(content: &str, start: usize) -> Option<usize> {
    let rest = content.get(start..)?;
    let terminator = if rest.starts_with("<%--") { "--%>" } else { "%>" };
    rest.get(2..)?
        .find(terminator)
        .map(|i| start + 2 + i + terminator.len())
}

/// Build the node for a JSP construct from its raw source
fn jsp_node(raw: &str, line: usize, end_line: usize) -> Node {
    let node = if raw.starts_with("<%--") {
        Node::comment(raw, line)
    } else if let Some(body) = raw.strip_prefix("<%@") {
        let name = body
            .split(|c: char| c.is_whitespace() || c == '%')
            .find(|s| !s.is_empty())
            .unwrap_or("");
        Node::directive(name, raw, line)
    } else {
        Node::expression(raw, line)
    };
    node.with_end_line(end_line)
}

/// Offset of the end tag closing a raw-text element opened before `from`
fn raw_text_end(content: &str, from: usize, name: &str) -> Option<usize> {
    let rest = content.get(from..)?.to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());
    rest.find(&needle).map(|i| from + i)
}

/// Parse page content into a tree rooted at a `Document` node
pub fn parse_page(content: &str) -> Result<Node, ParseError> {
    let lines = LineIndex::new(content);
    let mut tree = TreeBuilder::new();
    let mut base = 0;
    let mut reader = reader_at(content, base);
    let mut buf = Vec::new();

    loop {
        let start = base + reader.buffer_position() as usize;

        if let Some(tag_start) = jsp_start(content, start) {
            let close = jsp_end(content, tag_start).unwrap_or(content.len());
            tree.add(jsp_node(
                slice(content, tag_start, close),
                lines.line_at(tag_start),
                lines.last_line_of(tag_start, close),
            ));
            base = close;
            reader = reader_at(content, base);
            continue;
        }

        let event = reader.read_event_into(&mut buf);
        let end = base + reader.buffer_position() as usize;
        let mut resume_at = None;

        match event {
            Ok(Event::Start(e)) => {
                let tag_start = markup_start(content, start);
                let node = element(&e, lines.line_at(tag_start))
                    .with_end_line(lines.last_line_of(tag_start, end));
                let name = node.name().to_ascii_lowercase();

                if VOID_ELEMENTS.contains(&name.as_str()) {
                    tree.add(node);
                } else {
                    tree.open(node);
                    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        if let Some(close) = raw_text_end(content, end, &name) {
                            let body = slice(content, end, close);
                            add_text(&mut tree, &lines, body, end);
                            resume_at = Some(close);
                        }
                    }
                }
            }

            Ok(Event::Empty(e)) => {
                let tag_start = markup_start(content, start);
                tree.add(
                    element(&e, lines.line_at(tag_start))
                        .with_end_line(lines.last_line_of(tag_start, end)),
                );
            }

            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                tree.close(&name, lines.last_line_of(start, end));
            }

            Ok(Event::Text(e)) => {
                let text = String::from_utf8_lossy(&e);
                add_text(&mut tree, &lines, &text, start);
            }

            Ok(Event::CData(_)) => {
                let tag_start = markup_start(content, start);
                let raw = slice(content, tag_start, end);
                tree.add(
                    Node::text(raw, lines.line_at(tag_start))
                        .with_end_line(lines.last_line_of(tag_start, end)),
                );
            }

            Ok(Event::Comment(_)) => {
                let tag_start = markup_start(content, start);
                let raw = slice(content, tag_start, end);
                tree.add(
                    Node::comment(raw, lines.line_at(tag_start))
                        .with_end_line(lines.last_line_of(tag_start, end)),
                );
            }

            Ok(Event::DocType(_)) => {
                let tag_start = markup_start(content, start);
                let raw = slice(content, tag_start, end);
                tree.add(
                    Node::directive("!DOCTYPE", raw, lines.line_at(tag_start))
                        .with_end_line(lines.last_line_of(tag_start, end)),
                );
            }

            Ok(Event::Decl(_)) | Ok(Event::PI(_)) => {
                let tag_start = markup_start(content, start);
                let raw = slice(content, tag_start, end);
                let target = raw
                    .trim_start_matches("<?")
                    .split(|c: char| c.is_whitespace() || c == '?')
                    .next()
                    .unwrap_or("");
                tree.add(
                    Node::directive(&format!("?{}", target), raw, lines.line_at(tag_start))
                        .with_end_line(lines.last_line_of(tag_start, end)),
                );
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(ParseError::Markup {
                    line: lines.line_at(start),
                    message: e.to_string(),
                });
            }
        }

        buf.clear();

        if let Some(offset) = resume_at {
            base = offset;
            reader = reader_at(content, base);
        }
    }

    Ok(tree.finish(lines.last_line))
}

/// Add a text node for `text` found at byte `offset`, unless it is blank
fn add_text(tree: &mut TreeBuilder, lines: &LineIndex, text: &str, offset: usize) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    let first = offset + (text.len() - text.trim_start().len());
    let last = offset + text.trim_end().len();
    tree.add(Node::text(trimmed, lines.line_at(first)).with_end_line(lines.last_line_of(first, last)));
}
