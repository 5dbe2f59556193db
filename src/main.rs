//! pagelint CLI - rule-based checks for HTML and JSP pages

use clap::{Parser, ValueEnum};
use colored::Colorize;
use pagelint::config::{ColorMode, Config, OutputFormat, Overrides};
use pagelint::discover::collect_files;
use pagelint::engine::Engine;
use pagelint::output::formatter_for;
use pagelint::registry::CheckRegistry;
use pagelint::visitor::in_check_callback;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pagelint",
    version,
    about = "HTML and JSP page linter",
    long_about = "Runs rule-based checks over HTML and JSP pages and reports violations by line."
)]
struct Cli {
    /// Files, directories or glob patterns to lint
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Only enable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Compact,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Compact => OutputFormat::Compact,
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(2);
}

fn list_rules(registry: &CheckRegistry, config: &Config) {
    println!("{}", "Available rules:".bold());
    for rule in registry.rules() {
        let enabled = config.is_rule_enabled(&rule.id, rule.enabled);
        let severity = config.get_severity_override(&rule.id).unwrap_or(rule.severity);
        println!(
            "  {} {:<24} {:<8} {:<16} {}",
            if enabled { "+".green() } else { "-".dimmed() },
            rule.id.cyan(),
            severity.to_string(),
            rule.category.to_string(),
            rule.description
        );
        for (key, default) in &rule.params {
            let value = config
                .rule_params(&rule.id)
                .and_then(|p| p.get(key))
                .unwrap_or(default);
            println!("      {} = \"{}\"", key.dimmed(), value);
        }
    }
    println!("\n{} rules", registry.len());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Check panics are reported as failures; only other panics reach stderr
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if in_check_callback() {
            log::debug!("{}", info);
        } else {
            default_hook(info);
        }
    }));

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .unwrap_or_else(|e| fail(format!("Failed to load config {}: {}", path.display(), e))),
        None => Config::load_default().unwrap_or_else(|e| {
            log::warn!("Ignoring default configuration: {}", e);
            Config::default()
        }),
    };

    config.apply(Overrides {
        format: cli.format.map(OutputFormat::from),
        color: cli.no_color.then_some(ColorMode::Never),
        verbose: cli.verbose.then_some(true),
        jobs: cli.jobs,
        disable: cli.disable.unwrap_or_default(),
        select: cli.select,
    });

    let use_color = match config.output.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    };
    colored::control::set_override(use_color);

    let registry = CheckRegistry::with_builtin_checks();

    if cli.list_rules {
        list_rules(&registry, &config);
        return;
    }

    let engine = Engine::new(config, &registry).unwrap_or_else(|e| fail(e));

    let inputs = if cli.files.is_empty() {
        vec![".".to_string()]
    } else {
        cli.files
    };
    let files = collect_files(&inputs, &engine.config().files).unwrap_or_else(|e| fail(e));

    if files.is_empty() {
        fail("No files found to lint");
    }

    let verbose = engine.config().output.verbose;
    if verbose {
        eprintln!(
            "Linting {} files with {} rules...",
            files.len(),
            engine.checks().len()
        );
    }

    let result = engine.lint(&files);

    let formatter = formatter_for(&engine.config().output, use_color);
    print!("{}", formatter.format(&result));

    std::process::exit(result.exit_code());
}
