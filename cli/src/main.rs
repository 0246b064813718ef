// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Tapestry Navigator CLI
//!
//! The `tapestry` binary runs one-shot navigator queries against a tapestry
//! snapshot loaded into an in-process engine.
//!
//! ## Commands
//!
//! - `tapestry facet-types` - Enumerate facet types
//! - `tapestry top|search` - Ranked and semantic facet lookup
//! - `tapestry threads|memories|related-facets|related-memories` - Graph traversal
//! - `tapestry config show|validate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use tapestry_navigator::commands::{self, ConfigCommand, QueryCommand};
use tapestry_navigator::output::OutputFormat;

/// Tapestry Navigator - facet graph retrieval from the command line
#[derive(Parser)]
#[command(name = "tapestry")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "TAPESTRY_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Snapshot to load before querying (overrides snapshot.path)
    #[arg(short, long, global = true, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Query budget in milliseconds (overrides query.timeout_ms)
    #[arg(long, global = true, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Output format for query results
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "TAPESTRY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines instead of compact text
    #[arg(long, global = true, env = "TAPESTRY_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommand),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_json)?;

    match cli.command {
        Some(Commands::Query(command)) => {
            let options = commands::query::RunOptions {
                config_path: cli.config,
                snapshot: cli.snapshot,
                timeout_ms: cli.timeout_ms,
                output: cli.output,
            };
            commands::query::handle_command(command, options).await
        }
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
