//! Input loading
//!
//! Reads a line-delimited integer file into memory before the run starts.
//! One integer per line; surrounding whitespace and blank lines are ignored.
//! An unreadable source is reported as `SourceUnavailable` and a line that is
//! not an integer as `MalformedInput`; in both cases no run takes place.

pub mod generate;

use crate::error::{SumError, SumResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Load every integer from `path`
///
/// # Errors
///
/// - `SumError::SourceUnavailable` if the file cannot be opened or read
/// - `SumError::MalformedInput` for the first line that is not an integer
///   (including lines that are not valid UTF-8)
pub fn load_integers(path: &Path) -> SumResult<Vec<i64>> {
    let file = File::open(path).map_err(|source| SumError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let values = parse_integers(BufReader::new(file), path)?;
    tracing::debug!(path = %path.display(), count = values.len(), "Loaded input");

    Ok(values)
}

/// Parse line-delimited integers from any buffered reader
///
/// `path` is only used to label errors.
pub fn parse_integers<R: BufRead>(reader: R, path: &Path) -> SumResult<Vec<i64>> {
    let mut values = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData => SumError::MalformedInput {
                path: path.to_path_buf(),
                line: index + 1,
                content: "<invalid UTF-8>".to_string(),
            },
            _ => SumError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value = trimmed.parse::<i64>().map_err(|_| SumError::MalformedInput {
            path: path.to_path_buf(),
            line: index + 1,
            content: trimmed.to_string(),
        })?;
        values.push(value);
    }

    Ok(values)
}
