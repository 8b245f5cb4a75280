//! TOML configuration file parsing
//!
//! ```toml
//! [run]
//! workers = 4
//! backend = "process"
//! verify = true
//!
//! [input]
//! file_index = 2
//! data_dir = "/srv/data"
//!
//! [output]
//! format = "json"
//! json_path = "report.json"
//! ```

use super::cli::Cli;
use super::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(workers) = cli.workers {
        config.run.workers = workers;
    }
    if let Some(backend) = cli.backend {
        config.run.backend = backend;
    }
    if cli.verify {
        config.run.verify = true;
    }

    // An explicit path on the CLI beats an index from the file and vice versa
    if let Some(ref path) = cli.input {
        config.input.path = Some(path.clone());
        config.input.file_index = None;
    } else if let Some(index) = cli.file_index {
        config.input.file_index = Some(index);
        config.input.path = None;
    }
    if let Some(ref dir) = cli.data_dir {
        config.input.data_dir = dir.clone();
    }

    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(ref path) = cli.json_output {
        config.output.json_path = Some(path.clone());
    }

    config
}

/// Build the effective configuration from an optional file plus CLI overrides
pub fn build_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };

    Ok(merge_cli_with_config(cli, base))
}
