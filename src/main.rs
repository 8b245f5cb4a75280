//! forksum CLI entry point

use anyhow::{Context, Result};
use chrono::Local;
use forksum::config::cli::{Cli, ExecutionMode};
use forksum::config::{toml, validator, Config, OutputFormat};
use forksum::input::generate::{generate_values, write_data_file, GenerateOptions};
use forksum::input::load_integers;
use forksum::logging::{self, LogConfig};
use forksum::output::json::{write_json_report, JsonReport};
use forksum::output::text;
use forksum::util::time::Timer;
use forksum::util::verification::{verify_total, VerificationResult};
use forksum::Coordinator;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    logging::init(LogConfig::for_cli(cli.debug).with_env_overrides());

    match cli.mode {
        ExecutionMode::Run => run_sum(&cli),
        ExecutionMode::Generate => run_generate(&cli),
    }
}

/// Load the input, fan out, collect, report
fn run_sum(cli: &Cli) -> Result<()> {
    let config = toml::build_config(cli)?;
    validator::validate_config(&config)?;

    if cli.dry_run {
        println!("{}", config);
        println!("Configuration is valid");
        return Ok(());
    }

    let worker_count = config.run.worker_count()?;
    let input_path = config.input.resolve()?;
    tracing::debug!(path = %input_path.display(), workers = worker_count, backend = %config.run.backend, "Starting run");

    // Duration covers loading as well as the fan-out and collection
    let started_at = Local::now();
    let timer = Timer::start();

    let data: Arc<[i64]> = load_integers(&input_path)?.into();

    let mut coordinator = Coordinator::new(config.run.backend.worker_unit(), worker_count);
    let report = coordinator.run_timed(Arc::clone(&data), timer)?;

    if cli.debug {
        eprint!("{}", text::render_details(&report));
    }

    match config.output.format {
        OutputFormat::Text => text::print_report(&report),
        OutputFormat::Json => {
            let json = JsonReport::from_report(&report, started_at);
            println!("{}", json.to_json_string()?);
        }
    }

    if let Some(ref path) = config.output.json_path {
        let json = JsonReport::from_report(&report, started_at);
        write_json_report(path, &json)?;
        tracing::info!(path = %path.display(), "JSON report written");
    }

    if config.run.verify {
        match verify_total(&data, &report.total)? {
            VerificationResult::Success { sum } => {
                eprintln!("Verification passed: total {} matches reference sum", sum);
            }
            VerificationResult::Skipped { failed } => {
                eprintln!("Verification skipped: workers {:?} did not report", failed);
            }
        }
    }

    if !report.is_complete() {
        anyhow::bail!(
            "Run degraded: {} of {} workers did not report",
            report.total.failed_workers().len(),
            report.worker_count()
        );
    }

    Ok(())
}

/// Write a random data file to the selected input path
fn run_generate(cli: &Cli) -> Result<()> {
    let config: Config = toml::build_config(cli)?;
    validator::validate_input(&config.input)?;
    let path = config.input.resolve()?;

    let options = GenerateOptions {
        count: cli.count,
        min: cli.min,
        max: cli.max,
        seed: cli.seed,
    };

    if cli.dry_run {
        println!("Would write {} integers in [{}, {}] to {}", options.count, options.min, options.max, path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let values = generate_values(&options);
    write_data_file(&path, &values)?;

    println!("Wrote {} integers to {}", values.len(), path.display());
    Ok(())
}
