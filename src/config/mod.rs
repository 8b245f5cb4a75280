//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! CLI values take precedence over file values; anything unset in both falls
//! back to the defaults below.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::error::{SumError, SumResult};
use crate::worker::{ProcessWorker, ThreadWorker, WorkerUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Worker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of workers; signed so a negative value can be reported as
    /// invalid instead of failing to parse
    #[serde(default = "default_workers")]
    pub workers: i64,
    /// Worker backend
    #[serde(default)]
    pub backend: Backend,
    /// Cross-check the total against an in-process reference sum
    #[serde(default)]
    pub verify: bool,
}

fn default_workers() -> i64 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            backend: Backend::default(),
            verify: false,
        }
    }
}

impl RunConfig {
    /// Worker count as the core expects it
    ///
    /// # Errors
    ///
    /// `SumError::InvalidConfiguration` for zero or negative counts.
    pub fn worker_count(&self) -> SumResult<usize> {
        if self.workers <= 0 {
            return Err(SumError::InvalidConfiguration(format!(
                "worker count must be a positive integer, got {}",
                self.workers
            )));
        }
        usize::try_from(self.workers).map_err(|_| {
            SumError::InvalidConfiguration(format!("worker count {} is too large", self.workers))
        })
    }
}

/// Worker backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Forked child processes
    #[default]
    Process,
    /// OS threads
    Thread,
}

impl Backend {
    pub fn worker_unit(self) -> Box<dyn WorkerUnit> {
        match self {
            Self::Process => Box::new(ProcessWorker),
            Self::Thread => Box::new(ThreadWorker),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Thread => write!(f, "thread"),
        }
    }
}

/// Input selection
///
/// Either an explicit `path`, or a `file_index` N that resolves to
/// `<data_dir>/fileN.dat`. An explicit path wins when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    pub file_index: Option<u32>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            file_index: None,
            data_dir: default_data_dir(),
        }
    }
}

impl InputConfig {
    /// Path of the selected input file
    ///
    /// # Errors
    ///
    /// `SumError::InvalidConfiguration` if neither a path nor an index is set.
    pub fn resolve(&self) -> SumResult<PathBuf> {
        if let Some(ref path) = self.path {
            return Ok(path.clone());
        }
        match self.file_index {
            Some(index) => Ok(indexed_data_file(&self.data_dir, index)),
            None => Err(SumError::InvalidConfiguration(
                "no input selected: pass --input PATH or --file-index N".to_string(),
            )),
        }
    }
}

/// `<data_dir>/file<index>.dat`
pub fn indexed_data_file(data_dir: &Path, index: u32) -> PathBuf {
    data_dir.join(format!("file{}.dat", index))
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Also write the JSON report to this file
    pub json_path: Option<PathBuf>,
}

/// Output format for stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Workers: {}", self.run.workers)?;
        writeln!(f, "Backend: {}", self.run.backend)?;
        match self.input.resolve() {
            Ok(path) => writeln!(f, "Input:   {}", path.display())?,
            Err(_) => writeln!(f, "Input:   (none)")?,
        }
        write!(f, "Verify:  {}", if self.run.verify { "yes" } else { "no" })
    }
}
