//! Logging setup
//!
//! All diagnostics go to stderr through `tracing`; stdout carries only the
//! run report.
//!
//! # Environment Variables
//!
//! - `FORKSUM_LOG` - Log filter (overrides RUST_LOG)
//! - `FORKSUM_LOG_FORMAT` - Output format: pretty, compact
//! - `RUST_LOG` - Standard Rust log filter (fallback)
//!
//! Forked workers never log: the child side of a fork only sums, writes its
//! value and exits.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Single-line events
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "full" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            _ => Err(format!(
                "Unknown log format: '{}'. Valid options: pretty, compact",
                s
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level (default: WARN, so a clean run prints nothing to stderr)
    pub level: Level,
    pub format: LogFormat,
    /// Custom filter string (overrides level if set)
    pub filter: Option<String>,
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Pretty,
            filter: None,
            show_target: false,
        }
    }
}

impl LogConfig {
    /// Config for the CLI: `--debug` raises the level to DEBUG
    pub fn for_cli(debug: bool) -> Self {
        let config = Self::default();
        if debug {
            config.with_level(Level::DEBUG).with_target(true)
        } else {
            config
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: String) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Apply environment variable overrides
    ///
    /// A filter already set programmatically is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if self.filter.is_none() {
            if let Ok(filter) = std::env::var("FORKSUM_LOG") {
                self.filter = Some(filter);
            } else if let Ok(filter) = std::env::var("RUST_LOG") {
                self.filter = Some(filter);
            }
        }

        if let Ok(format) = std::env::var("FORKSUM_LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                self.format = format;
            }
        }

        self
    }

    fn build_filter(&self) -> EnvFilter {
        let default_filter = || EnvFilter::new(self.level.to_string().to_lowercase());

        match self.filter {
            Some(ref filter) => EnvFilter::try_new(filter).unwrap_or_else(|_| {
                eprintln!("Warning: Invalid log filter '{}', using default", filter);
                default_filter()
            }),
            None => default_filter(),
        }
    }
}

/// Install the global subscriber
///
/// Later calls are ignored, so tests and repeated setup are harmless.
pub fn init(config: LogConfig) {
    let filter = config.build_filter();

    let result = match config.format {
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(config.show_target)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_target(config.show_target)
                .with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(err) = result {
        tracing::debug!("Logging already initialized: {}", err);
    }
}
