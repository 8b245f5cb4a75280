//! CLI argument parsing using clap

use super::{Backend, OutputFormat};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Sum the selected input (default)
    Run,
    /// Write a random data file to the selected input path
    Generate,
}

/// forksum - sum integers across worker processes
#[derive(Parser, Debug)]
#[command(name = "forksum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: run or generate
    #[arg(long, value_enum, default_value = "run")]
    pub mode: ExecutionMode,

    /// TOML configuration file (CLI options override its values)
    #[arg(short = 'c', long, env = "FORKSUM_CONFIG")]
    pub config: Option<PathBuf>,

    // === Run Options ===
    /// Number of worker processes (e.g., 1, 2, 4)
    #[arg(short = 'w', long, allow_negative_numbers = true)]
    pub workers: Option<i64>,

    /// Worker backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Cross-check the total against an in-process reference sum
    #[arg(long)]
    pub verify: bool,

    // === Input Options ===
    /// Input file of line-delimited integers
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Select input by index: reads <data-dir>/file<N>.dat
    #[arg(short = 'f', long, value_name = "N")]
    pub file_index: Option<u32>,

    /// Directory holding indexed data files
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    // === Output Options ===
    /// Output format for stdout
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Also write the JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub json_output: Option<PathBuf>,

    // === Generate Options ===
    /// Number of integers to generate
    #[arg(long, default_value = "1000")]
    pub count: usize,

    /// Smallest generated value
    #[arg(long, default_value = "-1000", allow_negative_numbers = true)]
    pub min: i64,

    /// Largest generated value
    #[arg(long, default_value = "1000", allow_negative_numbers = true)]
    pub max: i64,

    /// Seed for reproducible generation
    #[arg(long)]
    pub seed: Option<u64>,

    // === Misc ===
    /// Validate configuration and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks that only make sense on the raw arguments
    pub fn validate(&self) -> Result<()> {
        if self.mode == ExecutionMode::Generate {
            if self.min > self.max {
                anyhow::bail!("--min ({}) must not exceed --max ({})", self.min, self.max);
            }
            if self.input.is_none() && self.file_index.is_none() && self.config.is_none() {
                anyhow::bail!("generate mode needs an output path: pass --input PATH or --file-index N");
            }
        }

        Ok(())
    }
}
