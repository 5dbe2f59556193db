//! Configuration for the page linter
//!
//! Reads configuration from:
//! - `.pagelintrc.yaml` / `.pagelintrc.json` (project-level)
//! - `~/.pagelintrc.yaml` (user-level)

use crate::qualified::QualifiedAttributeError;
use crate::violation::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid configuration for rule '{rule}': {source}")]
    InvalidRule {
        rule: String,
        #[source]
        source: QualifiedAttributeError,
    },

    #[error("Unknown parameter '{param}' for rule '{rule}'")]
    UnknownParameter { rule: String, param: String },
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lint files in parallel
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    pub color: ColorMode,

    /// Show passing files and failure details
    pub verbose: bool,

    /// Show the summary line
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
            statistics: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Compact,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Include patterns, used when a directory is linted
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec![
                "**/*.jsp".to_string(),
                "**/*.jspf".to_string(),
                "**/*.html".to_string(),
                "**/*.htm".to_string(),
                "**/*.xhtml".to_string(),
            ],
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/WEB-INF/classes/**".to_string(),
            ],
        }
    }
}

/// Rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Disabled rules
    pub disabled: Vec<String>,

    /// Enabled rules (empty = all)
    pub enabled: Vec<String>,

    /// Select rules by prefix (e.g., "dynamic" selects all dynamic* rules)
    pub extend: Vec<String>,

    /// Ignore rules by prefix
    pub ignore: Vec<String>,

    /// Severity overrides (rule_id -> severity)
    pub severity: HashMap<String, Severity>,

    /// Per-file rule ignores (glob pattern -> rule IDs)
    pub per_file: HashMap<String, Vec<String>>,

    /// Parameter overrides (rule_id -> parameter -> value)
    pub params: HashMap<String, BTreeMap<String, String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Other configuration files this one builds on
    pub extends: Vec<String>,

    pub engine: EngineConfig,

    pub output: OutputConfig,

    pub files: FilesConfig,

    pub rules: RulesConfig,
}

/// Names tried by [`Config::find_default`], in order
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    ".pagelintrc.yaml",
    ".pagelintrc.yml",
    ".pagelintrc.json",
    "pagelint.yaml",
];

/// Deepest `extends` chain accepted before assuming a cycle
const MAX_EXTENDS_DEPTH: usize = 10;

/// Settings given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub format: Option<OutputFormat>,
    pub color: Option<ColorMode>,
    pub verbose: Option<bool>,
    pub jobs: Option<usize>,
    /// Added to `rules.disabled`
    pub disable: Vec<String>,
    /// Replaces `rules.enabled` when set
    pub select: Option<Vec<String>>,
}

impl EngineConfig {
    fn merge(&mut self, other: Self) {
        self.parallel = other.parallel;
        if other.jobs > 0 {
            self.jobs = other.jobs;
        }
    }
}

impl OutputConfig {
    fn merge(&mut self, other: Self) {
        if other.format != OutputFormat::default() {
            self.format = other.format;
        }
        if other.color != ColorMode::default() {
            self.color = other.color;
        }
        self.verbose |= other.verbose;
        self.statistics = other.statistics;
    }
}

impl FilesConfig {
    fn merge(&mut self, other: Self) {
        for (target, patterns) in [
            (&mut self.include, other.include),
            (&mut self.exclude, other.exclude),
        ] {
            for pattern in patterns {
                if !target.contains(&pattern) {
                    target.push(pattern);
                }
            }
        }
    }
}

impl RulesConfig {
    fn merge(&mut self, other: Self) {
        self.disabled.extend(other.disabled);
        if !other.enabled.is_empty() {
            self.enabled = other.enabled;
        }
        self.extend.extend(other.extend);
        self.ignore.extend(other.ignore);
        self.severity.extend(other.severity);
        for (pattern, rules) in other.per_file {
            self.per_file.entry(pattern).or_default().extend(rules);
        }
        // Parameters merge key by key so a child can override one of several
        for (rule_id, params) in other.params {
            self.params.entry(rule_id).or_default().extend(params);
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML or JSON configuration file, resolving `extends`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_chain(path, 0)
    }

    fn load_chain(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        if depth >= MAX_EXTENDS_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "'extends' nested deeper than {} levels at {}",
                MAX_EXTENDS_DEPTH,
                path.display()
            )));
        }

        log::debug!("Loading configuration from {}", path.display());
        let own = Self::parse_file(path)?;
        if own.extends.is_empty() {
            return Ok(own);
        }

        let dir = path.parent().unwrap_or(Path::new("."));
        let mut merged = Self::default();
        for base in &own.extends {
            // Relative bases resolve against the extending file; absolute ones stay put
            merged.merge(Self::load_chain(&dir.join(base), depth + 1)?);
        }
        merged.merge(own);
        Ok(merged)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            other => Err(ConfigError::Invalid(format!(
                "{} is not a .yaml, .yml or .json file (extension {:?})",
                path.display(),
                other.unwrap_or("")
            ))),
        }
    }

    /// Layer `other` over this configuration; `other` wins on conflicts
    ///
    /// `extends` itself is never inherited.
    pub fn merge(&mut self, other: Self) {
        self.engine.merge(other.engine);
        self.output.merge(other.output);
        self.files.merge(other.files);
        self.rules.merge(other.rules);
    }

    /// First configuration file found in the working directory, then in
    /// the home directory
    pub fn find_default() -> Option<PathBuf> {
        std::iter::once(PathBuf::from("."))
            .chain(dirs::home_dir())
            .flat_map(|dir| CONFIG_FILE_NAMES.map(|name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Load the default configuration file, or the built-in defaults when
    /// there is none
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::find_default() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line settings on top of the loaded configuration
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if let Some(color) = overrides.color {
            self.output.color = color;
        }
        if let Some(verbose) = overrides.verbose {
            self.output.verbose = verbose;
        }
        if let Some(jobs) = overrides.jobs {
            self.engine.jobs = jobs;
        }
        self.rules.disabled.extend(overrides.disable);
        if let Some(select) = overrides.select {
            self.rules.enabled = select;
        }
    }

    /// Whether a rule runs under this configuration
    ///
    /// `disabled` and `ignore` always win. Otherwise an `enabled` list, or
    /// failing that the `extend` prefixes, decide; with neither, the rule's
    /// own `default_enabled` applies.
    pub fn is_rule_enabled(&self, rule_id: &str, default_enabled: bool) -> bool {
        let rules = &self.rules;
        if rules.disabled.iter().any(|r| r == rule_id) || matches_prefix(&rules.ignore, rule_id) {
            false
        } else if !rules.enabled.is_empty() {
            rules.enabled.iter().any(|r| r == rule_id)
        } else if !rules.extend.is_empty() {
            matches_prefix(&rules.extend, rule_id)
        } else {
            default_enabled
        }
    }

    pub fn get_severity_override(&self, rule_id: &str) -> Option<Severity> {
        self.rules.severity.get(rule_id).copied()
    }

    /// Parameter overrides configured for a rule
    pub fn rule_params(&self, rule_id: &str) -> Option<&BTreeMap<String, String>> {
        self.rules.params.get(rule_id)
    }

    /// Whether a `per_file` entry matching `file_path` lists `rule_id` or `all`
    pub fn should_ignore_rule_for_file(&self, rule_id: &str, file_path: &Path) -> bool {
        self.rules
            .per_file
            .iter()
            .filter(|(_, rules)| rules.iter().any(|r| r == "all" || r == rule_id))
            .any(|(pattern, _)| match globset::Glob::new(pattern) {
                Ok(glob) => glob.compile_matcher().is_match(file_path),
                Err(e) => {
                    log::warn!("Ignoring invalid per_file pattern '{}': {}", pattern, e);
                    false
                }
            })
    }
}

/// ASCII case-insensitive prefix match against any of `prefixes`
fn matches_prefix(prefixes: &[String], rule_id: &str) -> bool {
    prefixes.iter().any(|prefix| {
        rule_id
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
        use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.files.include.contains(&"**/*.jsp".to_string()));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "compact".parse::<OutputFormat>().unwrap(),
            OutputFormat::Compact
        );
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::new();
        config.rules.disabled.push("avoid-html-comment".to_string());
        config.apply(Overrides {
            format: Some(OutputFormat::Json),
            color: Some(ColorMode::Never),
            verbose: Some(true),
            jobs: Some(4),
            disable: vec!["inline-style".to_string()],
            select: None,
        });

        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.color, ColorMode::Never);
        assert!(config.output.verbose);
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_rule_enabled("inline-style", true));
        assert!(!config.is_rule_enabled("avoid-html-comment", true));
        assert!(config.is_rule_enabled("required-attribute", true));
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = Config::new();
        config.output.format = OutputFormat::Compact;
        config.rules.enabled = vec!["inline-style".to_string()];
        config.apply(Overrides::default());

        assert_eq!(config.output.format, OutputFormat::Compact);
        assert_eq!(config.rules.enabled, vec!["inline-style"]);
    }

    #[test]
    fn test_merge_files_without_duplicates() {
        let mut base = Config::new();
        let mut other = Config::new();
        other.files.exclude.push("**/generated/**".to_string());
        base.merge(other);

        assert_eq!(base.files.include, FilesConfig::default().include);
        assert_eq!(base.files.exclude.len(), FilesConfig::default().exclude.len() + 1);
    }

    #[test]
    fn test_rule_enabled() {
        let mut config = Config::new();

        assert!(config.is_rule_enabled("any-rule", true));
        assert!(!config.is_rule_enabled("opt-in-rule", false));

        config.rules.disabled.push("disabled-rule".to_string());
        assert!(!config.is_rule_enabled("disabled-rule", true));
        assert!(config.is_rule_enabled("other-rule", true));

        config.rules.enabled = vec!["only-this".to_string(), "opt-in-rule".to_string()];
        assert!(!config.is_rule_enabled("disabled-rule", true));
        assert!(!config.is_rule_enabled("other-rule", true));
        assert!(config.is_rule_enabled("only-this", true));
        assert!(config.is_rule_enabled("opt-in-rule", false));
    }

    #[test]
    fn test_extend_and_ignore_prefixes() {
        let mut config = Config::new();
        config.rules.extend = vec!["dynamic".to_string(), "inline".to_string()];
        config.rules.ignore = vec!["inline-sc".to_string()];

        assert!(config.is_rule_enabled("dynamic-jsp-include", true));
        assert!(config.is_rule_enabled("INLINE-style", true));
        assert!(!config.is_rule_enabled("inline-script", true));
        assert!(!config.is_rule_enabled("required-attribute", true));
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::new();
        config
            .rules
            .severity
            .insert("inline-style".to_string(), Severity::Error);

        assert_eq!(
            config.get_severity_override("inline-style"),
            Some(Severity::Error)
        );
        assert_eq!(config.get_severity_override("other"), None);
    }

    #[test]
    fn test_per_file_ignore() {
        let mut config = Config::new();
        config.rules.per_file.insert(
            "**/legacy/**".to_string(),
            vec!["inline-style".to_string()],
        );
        config
            .rules
            .per_file
            .insert("**/vendor/*.html".to_string(), vec!["all".to_string()]);

        assert!(config.should_ignore_rule_for_file("inline-style", Path::new("web/legacy/a.jsp")));
        assert!(!config.should_ignore_rule_for_file("other", Path::new("web/legacy/a.jsp")));
        assert!(config.should_ignore_rule_for_file("other", Path::new("web/vendor/x.html")));
        assert!(!config.should_ignore_rule_for_file("inline-style", Path::new("web/a.jsp")));
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
output:
  format: json
  verbose: true
rules:
  disabled:
    - inline-style
  severity:
    dynamic-jsp-include: error
  params:
    required-attribute:
      attributes: "img.alt, a.href"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.rules.disabled, vec!["inline-style"]);
        assert_eq!(
            config.get_severity_override("dynamic-jsp-include"),
            Some(Severity::Error)
        );
        assert_eq!(
            config
                .rule_params("required-attribute")
                .and_then(|p| p.get("attributes"))
                .map(String::as_str),
            Some("img.alt, a.href")
        );
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".pagelintrc.json");
        std::fs::write(&path, r#"{"output": {"format": "compact"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output.format, OutputFormat::Compact);
    }

    #[test]
    fn test_load_with_extends() {
        let dir = TempDir::new().unwrap();

        std::fs::write(
            dir.path().join("base.yaml"),
            "rules:\n  disabled: [inline-style]\n  params:\n    illegal-attribute:\n      attributes: style\n      message: legacy\n",
        )
        .unwrap();

        let child = dir.path().join("child.yaml");
        std::fs::write(
            &child,
            "extends: [base.yaml]\nrules:\n  disabled: [avoid-html-comment]\n  params:\n    illegal-attribute:\n      attributes: \"style, bgcolor\"\n",
        )
        .unwrap();

        let config = Config::load(&child).unwrap();
        assert!(!config.is_rule_enabled("inline-style", true));
        assert!(!config.is_rule_enabled("avoid-html-comment", true));
        let params = &config.rules.params["illegal-attribute"];
        assert_eq!(params["attributes"], "style, bgcolor");
        assert_eq!(params["message"], "legacy");
    }

    #[test]
    fn test_extends_cycle_hits_depth_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("self.yaml");
        std::fs::write(&path, "extends: [self.yaml]\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_invalid_rule_error_display() {
        let err = ConfigError::InvalidRule {
            rule: "required-attribute".to_string(),
            source: QualifiedAttributeError::EmptyAttribute {
                token: "div.".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration for rule 'required-attribute': missing attribute name in 'div.'"
        );
    }
}
