//! Integration tests for pagelint

use pagelint::{
    check::{Check, CheckContext, CheckResult},
    config::{Config, ConfigError},
    discover::collect_files,
    document::PageDocument,
    engine::{Engine, FileReport, PARSE_ERROR_RULE},
    node::{Node, NodeKind},
    output::{JsonFormatter, OutputFormatter},
    registry::CheckRegistry,
    rule::Rule,
    violation::{Severity, ViolationSink},
    visitor::{walk, ActiveCheck},
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn builtin_engine(config: Config) -> Engine {
    Engine::new(config, &CheckRegistry::with_builtin_checks()).unwrap()
}

fn found(report: &FileReport) -> Vec<(&str, usize)> {
    report
        .violations
        .iter()
        .map(|v| (v.rule_id(), v.line()))
        .collect()
}

#[test]
fn test_parse_legacy_page() {
    let doc = PageDocument::read(&fixtures_path().join("legacy.jsp")).unwrap();
    let root = doc.root();

    let directives: Vec<_> = root
        .descendants()
        .filter(|n| n.kind() == NodeKind::Directive)
        .map(|n| (n.name(), n.start_line()))
        .collect();
    assert_eq!(directives, vec![("page", 1), ("include", 2)]);

    let html = root
        .children()
        .iter()
        .find(|n| n.has_name("html"))
        .unwrap();
    assert_eq!((html.start_line(), html.end_line()), (4, 22));

    assert!(doc.is_rule_disabled("required-attribute", 17));
    assert_eq!(doc.source_line(13), Some("<img src=\"logo.png\">"));
}

#[test]
fn test_lint_legacy_page_with_defaults() {
    let engine = builtin_engine(Config::default());
    let report = engine.lint_file(&fixtures_path().join("legacy.jsp"));

    assert_eq!(
        found(&report),
        vec![
            ("dynamic-jsp-include", 2),
            ("inline-style", 7),
            ("required-attribute", 13),
            ("illegal-attribute", 14),
            ("dynamic-jsp-include", 15),
            ("avoid-html-comment", 12),
        ]
    );
    assert_eq!(report.suppressed(), 1);
    assert!(report.failures.is_empty());

    let result = engine.lint(&[fixtures_path().join("legacy.jsp")]);
    assert_eq!(result.warning_count, 5);
    assert_eq!(result.info_count, 1);
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn test_lint_clean_page() {
    let engine = builtin_engine(Config::default());
    let report = engine.lint_file(&fixtures_path().join("clean.html"));

    assert!(report.is_clean(), "unexpected: {:?}", found(&report));
}

#[test]
fn test_lint_with_config_file() {
    let config = Config::load(&fixtures_path().join("strict.yaml")).unwrap();
    let engine = builtin_engine(config);
    let report = engine.lint_file(&fixtures_path().join("legacy.jsp"));

    assert_eq!(
        found(&report),
        vec![
            ("dynamic-jsp-include", 2),
            ("required-attribute", 13),
            ("illegal-attribute", 14),
            ("dynamic-jsp-include", 15),
            ("avoid-html-comment", 12),
        ]
    );
    assert_eq!(report.violations[1].severity(), Severity::Error);
    assert_eq!(
        report.violations[2].message(),
        "Attribute 'style' on <p> should not be used"
    );
}

#[test]
fn test_malformed_parameter_fails_before_linting() {
    let config = Config::load(&fixtures_path().join("bad-params.yaml")).unwrap();
    let err = Engine::new(config, &CheckRegistry::with_builtin_checks())
        .err()
        .unwrap();

    assert!(matches!(err, ConfigError::InvalidRule { ref rule, .. } if rule == "required-attribute"));
    assert_eq!(
        err.to_string(),
        "Invalid configuration for rule 'required-attribute': empty entry at position 2 in 'img.alt,,a.href'"
    );
}

#[test]
fn test_broken_page_is_reported_not_fatal() {
    let engine = builtin_engine(Config::default());
    let files = vec![
        fixtures_path().join("broken.jsp"),
        fixtures_path().join("clean.html"),
    ];
    let result = engine.lint(&files);

    assert_eq!(result.files_processed, 2);
    let broken = &result.files[0];
    assert_eq!(broken.violations.len(), 1);
    assert_eq!(broken.violations[0].rule_id(), PARSE_ERROR_RULE);
    assert_eq!(broken.violations[0].severity(), Severity::Error);
    assert!(result.files[1].is_clean());
    assert_eq!(result.exit_code(), 2);
}

#[test]
fn test_collect_fixture_directory() {
    let dir = fixtures_path().to_string_lossy().into_owned();
    let files = collect_files(&[dir], &Config::default().files).unwrap();

    let names: Vec<_> = files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["broken.jsp", "clean.html", "legacy.jsp"]);
}

#[test]
fn test_json_output_for_fixtures() {
    let engine = builtin_engine(Config::default());
    let result = engine.lint(&[fixtures_path().join("legacy.jsp")]);
    let output = JsonFormatter::new().format(&result);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["summary"]["warning_count"], 5);
    assert_eq!(value["files"][0]["suppressed"], 1);
    assert_eq!(
        value["files"][0]["violations"][2]["source_line"],
        "<img src=\"logo.png\">"
    );
}

/// A custom rule written against the public check contract
struct DeprecatedTag {
    seen: usize,
}

impl Check for DeprecatedTag {
    fn start_element(&mut self, element: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        self.seen += 1;
        if element.has_name("center") || element.has_name("font") {
            ctx.report_with_message(
                element.start_line(),
                format!("<{}> is deprecated", element.name()),
            );
        }
        Ok(())
    }

    fn end_document(&mut self, _root: &Node, ctx: &mut CheckContext<'_>) -> CheckResult {
        if self.seen == 0 {
            ctx.report(1);
        }
        Ok(())
    }
}

fn deprecated_tag(_rule: &Rule) -> Result<Box<dyn Check>, ConfigError> {
    Ok(Box::new(DeprecatedTag { seen: 0 }))
}

#[test]
fn test_custom_rule_through_registry() {
    let mut registry = CheckRegistry::with_builtin_checks();
    registry.register(
        Rule::new("deprecated-tag", "Page has no elements").with_severity(Severity::Error),
        deprecated_tag,
    );

    let mut config = Config::default();
    config.rules.enabled = vec!["deprecated-tag".to_string()];
    let engine = Engine::new(config, &registry).unwrap();

    let report = engine.lint_source(
        "<center>\n<font color=\"red\">x</font>\n</center>",
        &PathBuf::from("old.html"),
    );
    let messages: Vec<_> = report.violations.iter().map(|v| v.message()).collect();
    assert_eq!(messages, vec!["<center> is deprecated", "<font> is deprecated"]);

    let empty = engine.lint_source("just text", &PathBuf::from("empty.html"));
    assert_eq!(found(&empty), vec![("deprecated-tag", 1)]);
    assert_eq!(empty.violations[0].message(), "Page has no elements");
}

/// Counts element callbacks into a shared counter
struct ElementCounter(Arc<AtomicUsize>);

impl Check for ElementCounter {
    fn start_element(&mut self, _element: &Node, _ctx: &mut CheckContext<'_>) -> CheckResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_walk_dispatches_every_element_once() {
    let doc = PageDocument::read(&fixtures_path().join("legacy.jsp")).unwrap();
    let elements = doc.root().descendants().filter(|n| n.is_element()).count();
    assert_eq!(elements, 10);

    let counter = Arc::new(AtomicUsize::new(0));
    let rule = Arc::new(Rule::new("counter", "counts"));
    let mut checks = vec![ActiveCheck::new(
        rule,
        Box::new(ElementCounter(Arc::clone(&counter))),
    )];
    let mut sink = ViolationSink::new();
    let failures = walk(doc.root(), &mut checks, &mut sink);

    assert!(failures.is_empty());
    assert!(sink.is_empty());
    assert_eq!(counter.load(Ordering::SeqCst), elements);
}
