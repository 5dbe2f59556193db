//! Parsed page with source lines and inline suppressions

use crate::node::Node;
use crate::parser::{parse_page, ParseError};
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

// Supported formats, in `<!-- -->` or `<%-- --%>` comments:
//   pagelint-disable rule-id
//   pagelint-disable rule-id: reason here
//   pagelint-disable rule-id -- reason here
static DISABLE_RE: LazyLock<Regex> = LazyLock::new(|| disable_regex("pagelint-disable"));
static DISABLE_NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| disable_regex("pagelint-disable-next-line"));
static DISABLE_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| disable_regex("pagelint-disable-file"));

fn disable_regex(directive: &str) -> Regex {
    Regex::new(&format!(
        r"(?:<!--|<%--)\s*{}\s+(\S+?)(?:\s*:\s*(.+?)|\s+--\s+(.+?))?\s*--%?>",
        directive
    ))
    .unwrap()
}

/// A parsed page
#[derive(Debug)]
pub struct PageDocument {
    path: PathBuf,
    root: Node,
    source_lines: Vec<String>,
    disabled_lines: HashMap<String, HashSet<usize>>,
    disabled_file_rules: HashSet<String>,
    /// rule_id -> line -> reason (line 0 = file level)
    disable_reasons: HashMap<String, HashMap<usize, String>>,
}

impl PageDocument {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ParseError> {
        let root = parse_page(content)?;
        let source_lines: Vec<String> = content.lines().map(String::from).collect();

        let mut doc = Self {
            path: path.to_path_buf(),
            root,
            source_lines,
            disabled_lines: HashMap::new(),
            disabled_file_rules: HashSet::new(),
            disable_reasons: HashMap::new(),
        };
        doc.parse_disable_comments();
        Ok(doc)
    }

    /// Read and parse a page from disk
    pub fn read(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    fn parse_disable_comments(&mut self) {
        for i in 0..self.source_lines.len() {
            let line_num = i + 1;
            let line = self.source_lines[i].clone();

            for cap in DISABLE_FILE_RE.captures_iter(&line) {
                let rule_id = self.record_reason(&cap, 0);
                self.disabled_file_rules.insert(rule_id);
            }

            for cap in DISABLE_RE.captures_iter(&line) {
                let rule_id = self.record_reason(&cap, line_num);
                self.disabled_lines
                    .entry(rule_id)
                    .or_default()
                    .insert(line_num);
            }

            for cap in DISABLE_NEXT_RE.captures_iter(&line) {
                let rule_id = self.record_reason(&cap, line_num + 1);
                self.disabled_lines
                    .entry(rule_id)
                    .or_default()
                    .insert(line_num + 1);
            }
        }
    }

    /// Store the reason of a disable comment, returning its rule id
    fn record_reason(&mut self, cap: &Captures<'_>, line: usize) -> String {
        let rule_id = cap[1].to_string();
        // colon style or double-dash style
        let reason = cap
            .get(2)
            .or_else(|| cap.get(3))
            .map(|m| m.as_str().trim().to_string());
        if let Some(r) = reason {
            self.disable_reasons
                .entry(rule_id.clone())
                .or_default()
                .insert(line, r);
        }
        rule_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Get source line at line number (1-based)
    pub fn source_line(&self, line: usize) -> Option<&str> {
        if line > 0 && line <= self.source_lines.len() {
            Some(&self.source_lines[line - 1])
        } else {
            None
        }
    }

    pub fn line_count(&self) -> usize {
        self.source_lines.len()
    }

    /// Check if a rule is disabled at a specific line
    pub fn is_rule_disabled(&self, rule_id: &str, line: usize) -> bool {
        ["all", rule_id].iter().any(|id| {
            self.disabled_lines
                .get(*id)
                .is_some_and(|lines| lines.contains(&line))
        })
    }

    /// Check if a rule is disabled for the entire file
    pub fn is_rule_disabled_for_file(&self, rule_id: &str) -> bool {
        self.disabled_file_rules.contains("all") || self.disabled_file_rules.contains(rule_id)
    }

    /// Get the reason why a rule was disabled at a specific line
    pub fn get_disable_reason(&self, rule_id: &str, line: usize) -> Option<&str> {
        for id in [rule_id, "all"] {
            if let Some(lines) = self.disable_reasons.get(id) {
                if let Some(reason) = lines.get(&line).or_else(|| lines.get(&0)) {
                    return Some(reason);
                }
            }
        }
        None
    }
}
