//! Sealed - compiles sealed product contents against the master card catalog

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sealed_core::compiler::ContentCompiler;
use sealed_core::config::CompilerConfig;
use sealed_core::content::load_content_dir;
use sealed_core::diagnostics::Diagnostics;
use sealed_core::validator::{ContentValidator, Severity, ValidationReport};

mod catalog_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "sealed",
    about = "Compile sealed product contents against the master card catalog",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Configuration file (defaults to ./sealed.yaml when present)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Build (or reuse the cached) catalog index and summarize it
    Index {
        /// Master catalog JSON document
        #[clap(long)]
        catalog: Option<PathBuf>,

        /// Rebuild the index even if the cache is fresh
        #[clap(long)]
        refresh: bool,
    },

    /// Compile all content files and write the output artifacts
    Compile {
        /// Directory of per-set content files
        #[clap(long)]
        contents: Option<PathBuf>,

        /// Master catalog JSON document
        #[clap(long)]
        catalog: Option<PathBuf>,

        /// Output directory for contents.json, deck_map.json and card_map.json
        #[clap(long)]
        output: Option<PathBuf>,

        /// Rebuild the index even if the cache is fresh
        #[clap(long)]
        refresh: bool,
    },

    /// Check content files for authoring problems
    Validate {
        /// Directory of per-set content files
        #[clap(long)]
        contents: Option<PathBuf>,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Initialize tracing with CLI flags
///
/// Logs always go to stderr so stdout stays clean for `--json` output.
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let mut config = CompilerConfig::load(cli.config.as_deref())?;
    debug!("Configuration: {:?}", config);

    match cli.command {
        Command::Index { catalog, refresh } => {
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            catalog_cli::index_command(&config, refresh)
        }
        Command::Compile {
            contents,
            catalog,
            output,
            refresh,
        } => {
            if let Some(contents) = contents {
                config.contents_dir = contents;
            }
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            compile_command(&config, refresh)
        }
        Command::Validate { contents, json } => {
            if let Some(contents) = contents {
                config.contents_dir = contents;
            }
            validate_command(&config, json)
        }
    }
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn compile_command(config: &CompilerConfig, refresh: bool) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let index = catalog_cli::load_index(config, refresh, &mut diagnostics)?;
    info!("Catalog index ready: {} sets", index.container_count());

    let files = load_content_dir(&config.contents_dir)?;
    let output = ContentCompiler::new(&index).compile_all(&files);
    diagnostics.extend(output.diagnostics.clone());

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;
    write_json(&config.contents_output(), &output.contents_artifact()?)?;
    write_json(&config.deck_map_output(), &output.deck_links_artifact()?)?;
    write_json(&config.card_map_output(), &output.card_links_artifact()?)?;
    diagnostics.write_status_file(&config.status_file)?;

    println!(
        "Compiled {} products across {} sets",
        output.product_count(),
        output.contents.len()
    );
    println!(
        "Linked {} decks and {} cards; {} diagnostics written to {}",
        output.deck_links.deck_count(),
        output.card_links.card_count(),
        diagnostics.len(),
        config.status_file.display()
    );
    Ok(())
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Set")]
    container: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Rule")]
    rule_id: String,
    #[tabled(rename = "Message")]
    message: String,
}

fn validate_command(config: &CompilerConfig, json: bool) -> Result<()> {
    info!("Validating content files in: {:?}", config.contents_dir);

    let files = load_content_dir(&config.contents_dir)?;
    let report = ContentValidator::new().validate_all(&files);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_validation_report(&report);
    }

    // Exit with error code if there were errors
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_validation_report(report: &ValidationReport) {
    let mut issues: Vec<_> = report.issues().collect();
    issues.sort_by_key(|issue| issue.severity);

    if !issues.is_empty() {
        let rows: Vec<IssueRow> = issues
            .into_iter()
            .map(|issue| IssueRow {
                severity: issue.severity.to_string(),
                container: issue.container.clone(),
                product: issue.product.clone(),
                rule_id: issue.rule_id.to_string(),
                message: issue.message.clone(),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();
        println!("{table}\n");
    }

    let infos = report
        .issues()
        .filter(|issue| issue.severity == Severity::Info)
        .count();
    println!(
        "{} files checked: {} errors, {} warnings, {} notes",
        report.containers.len(),
        report.total_errors,
        report.total_warnings,
        infos
    );
}
