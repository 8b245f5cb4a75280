//! Configuration validation

use super::*;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_run(&config.run)?;
    validate_input(&config.input)?;
    validate_output(&config.output)?;

    Ok(())
}

/// Validate worker settings
pub fn validate_run(run: &RunConfig) -> Result<()> {
    let workers = run.worker_count()?;

    let cpus = num_cpus::get();
    if workers > cpus {
        tracing::warn!(
            workers,
            cpus,
            "Worker count exceeds available CPUs; workers will time-share"
        );
    }

    Ok(())
}

/// Validate input selection
pub fn validate_input(input: &InputConfig) -> Result<()> {
    if input.file_index == Some(0) {
        return Err(SumError::InvalidConfiguration(
            "file index starts at 1".to_string(),
        )
        .into());
    }

    input.resolve()?;

    Ok(())
}

/// Validate output settings
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let Some(ref path) = output.json_path {
        if path.as_os_str().is_empty() {
            anyhow::bail!("json output path must not be empty");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            input: InputConfig {
                file_index: Some(1),
                ..InputConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_workers_is_invalid_configuration() {
        let mut config = valid_config();
        config.run.workers = 0;

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SumError>(),
            Some(SumError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_many_workers_only_warns() {
        let mut config = valid_config();
        config.run.workers = (num_cpus::get() * 4) as i64;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_input_rejected() {
        let config = Config::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_index_zero_rejected() {
        let mut config = valid_config();
        config.input.file_index = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_json_path_rejected() {
        let mut config = valid_config();
        config.output.json_path = Some(PathBuf::new());
        assert!(validate_config(&config).is_err());
    }
}
