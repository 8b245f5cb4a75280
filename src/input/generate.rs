//! Random data file generation
//!
//! Produces line-delimited integer files in the format [`super::load_integers`]
//! reads. A seed makes the output reproducible.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// What to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    pub count: usize,
    /// Inclusive lower bound
    pub min: i64,
    /// Inclusive upper bound
    pub max: i64,
    pub seed: Option<u64>,
}

/// Generate `options.count` integers in `[options.min, options.max]`
pub fn generate_values(options: &GenerateOptions) -> Vec<i64> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..options.count).map(|_| rng.gen_range(options.min..=options.max)).collect()
}

/// Write values one per line
pub fn write_data_file(path: &Path, values: &[i64]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create data file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for value in values {
        writeln!(writer, "{}", value)
            .with_context(|| format!("Failed to write data file: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush data file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::load_integers;
    use tempfile::TempDir;

    #[test]
    fn test_generate_respects_bounds() {
        let options = GenerateOptions {
            count: 500,
            min: -5,
            max: 5,
            seed: Some(7),
        };
        let values = generate_values(&options);
        assert_eq!(values.len(), 500);
        assert!(values.iter().all(|v| (-5..=5).contains(v)));
    }

    #[test]
    fn test_generate_seeded_is_reproducible() {
        let options = GenerateOptions {
            count: 100,
            min: 0,
            max: 1_000_000,
            seed: Some(42),
        };
        assert_eq!(generate_values(&options), generate_values(&options));
    }

    #[test]
    fn test_generated_file_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file1.dat");
        let values = vec![3, -1, 0, 42];

        write_data_file(&path, &values).unwrap();
        assert_eq!(load_integers(&path).unwrap(), values);
    }
}
