use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sonarjson_core::{
    load_configuration, parse_yn, IssueType, MessageCatalog, Severity, SonarJsonReporter,
    SonarOptions, SonarReport,
};

mod pylint;

const DEFAULT_CONFIG: &str = "sonarjson.toml";

/// pylint-sonarjson - Convert Pylint messages to SonarQube generic issues
#[derive(Parser)]
#[command(name = "pylint-sonarjson")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:\n  pylint --output-format=json pkg | pylint-sonarjson -o sonar.json\n  pylint-sonarjson -i pylint.json --sonar-rules C0326:MINOR:1,E0102:MAJOR:5:BUG")]
struct Cli {
    /// Path to config file (default: sonarjson.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pylint JSON output to convert ("-" or absent reads stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Known message IDs, as `pylint --list-msgs` output or one ID per line
    #[arg(long, value_name = "PATH")]
    known_messages: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated list of rules, their severity, and the minutes of
    /// efforts to fix the issues. The syntax is
    /// <message id>:<severity>[:<effort minutes>[:<type>]].
    /// So e.g. --sonar-rules=C0326:MINOR:1,E0102:MAJOR:5:BUG
    #[arg(long, value_name = "RULES")]
    sonar_rules: Option<String>,

    /// Issue severity for rules not specified in --sonar-rules
    #[arg(long, value_name = "SEVERITY")]
    sonar_default_severity: Option<Severity>,

    /// Number of effort minutes for rules not specified in --sonar-rules
    #[arg(long, value_name = "EFFORT")]
    sonar_default_effort: Option<u32>,

    /// Type of SonarQube issue for rules not specified in --sonar-rules
    #[arg(long, value_name = "TYPE")]
    sonar_default_type: Option<IssueType>,

    /// Only enable messages specified in --sonar-rules
    #[arg(long, value_name = "Y_OR_N", value_parser = parse_yn)]
    only_enable_sonar_rules: Option<bool>,

    /// If enabled, a non-existing rule in --sonar-rules halts the run.
    /// When disabled, non-existing rules are reported on stderr but are
    /// otherwise ignored.
    #[arg(long, value_name = "Y_OR_N", value_parser = parse_yn)]
    halt_on_invalid_sonar_rules: Option<bool>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// CLI > config file > defaults
    fn apply_overrides(&self, mut options: SonarOptions) -> SonarOptions {
        if let Some(rules) = &self.sonar_rules {
            options.sonar_rules = rules.clone();
        }
        if let Some(severity) = self.sonar_default_severity {
            options.sonar_default_severity = severity;
        }
        if let Some(effort) = self.sonar_default_effort {
            options.sonar_default_effort = effort;
        }
        if let Some(issue_type) = self.sonar_default_type {
            options.sonar_default_type = issue_type;
        }
        if let Some(only_enable) = self.only_enable_sonar_rules {
            options.only_enable_sonar_rules = only_enable;
        }
        if let Some(halt) = self.halt_on_invalid_sonar_rules {
            options.halt_on_invalid_sonar_rules = halt;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.apply_overrides(load_options(cli.config.as_deref())?);

    let mut catalog = match &cli.known_messages {
        Some(path) => {
            let listing = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read known messages from {}", path.display()))?;
            MessageCatalog::parse_message_listing(&listing)
        }
        None => MessageCatalog::permissive(),
    };
    if let Some(count) = catalog.known_count() {
        tracing::debug!(known = count, "loaded message catalog");
    }

    let table = load_configuration(&options, &mut catalog)?;

    let input = read_input(cli.input.as_deref())?;
    let issues = pylint::parse_messages(&input).context("Failed to parse Pylint JSON output")?;

    let mut reporter = SonarJsonReporter::new(table, options.defaults());
    for issue in issues {
        if catalog.is_enabled(&issue.msg_id) {
            reporter.handle_message(issue);
        }
    }
    let report = reporter.display_messages();

    match &cli.output {
        Some(path) => {
            report
                .save_to_file(path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if cli.verbose {
                eprintln!("{} {}", "Report saved to:".green(), path.display());
            }
        }
        None => report.write_to(std::io::stdout().lock())?,
    }

    if cli.verbose {
        print_summary(&report);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_options(config: Option<&Path>) -> Result<SonarOptions> {
    if let Some(path) = config {
        return Ok(SonarOptions::from_file(path)?);
    }

    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        tracing::debug!("Using {}", default_path.display());
        Ok(SonarOptions::from_file(default_path)?)
    } else {
        tracing::debug!("No config file found, using defaults");
        Ok(SonarOptions::default())
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Pylint output from {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read Pylint output from stdin")?;
            Ok(buf)
        }
    }
}

/// Print severity breakdown to stderr
fn print_summary(report: &SonarReport) {
    eprintln!("{} {}", "Issues:".bold(), report.len());

    for (severity, count) in report.severity_counts().iter().rev() {
        let name = format!("{:<10}", severity.as_str());
        let label = match severity {
            Severity::Blocker | Severity::Critical => name.as_str().red().bold(),
            Severity::Major => name.as_str().yellow().bold(),
            Severity::Minor => name.as_str().yellow(),
            Severity::Info => name.as_str().cyan(),
        };
        eprintln!("  {} {}", label, count);
    }
}
