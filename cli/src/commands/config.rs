// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use tapestry_engine::domain::config::{NavigatorConfig, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = NavigatorConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./tapestry-config.yaml");
        println!("  4. ~/.tapestry/config.yaml");
        println!("  5. /etc/tapestry/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Query:".bold());
    println!("  Default top_k: {}", config.query.default_top_k);
    println!("  Default limit: {}", config.query.default_limit);
    println!("  Max top_k: {}", config.query.max_top_k);
    println!("  Timeout: {}ms", config.query.timeout_ms);
    println!();

    println!("{}", "Search:".bold());
    println!("  Default threshold: {}", config.search.default_threshold);
    for (name, preset) in [("precise", &config.search.precise), ("explore", &config.search.explore)] {
        println!(
            "  {}: threshold {}, top_k {}, related top_k {}",
            name.bold(),
            preset.threshold,
            preset.top_k,
            preset.related_top_k
        );
    }
    println!();

    println!("{}", "Embedding:".bold());
    println!("  Provider: {:?}", config.embedding.provider);
    println!("  Endpoint: {}", config.embedding.endpoint);
    println!("  Model: {}", config.embedding.model);
    println!("  Dimensions: {}", config.embedding.dimensions);
    println!("  Cache capacity: {}", config.embedding.cache_capacity);
    println!();

    println!("{}", "Snapshot:".bold());
    match &config.snapshot {
        Some(snapshot) => println!("  Path: {}", snapshot.path.display()),
        None => println!("  Path: {}", "(none)".dimmed()),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = NavigatorConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    if let Some(snapshot) = &config.snapshot {
        if !snapshot.path.exists() {
            println!(
                "{}",
                format!("⚠ Snapshot path does not exist: {}", snapshot.path.display()).yellow()
            );
        }
    }

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}
