//! Error types for forksum.
//!
//! `SumError` covers everything that stops a run. Per-worker collection faults
//! do not stop a run and live in [`crate::stats::WorkerFault`] instead.

use crate::partition::Block;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum SumError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to spawn worker {worker_id}: {source}")]
    SpawnFailed {
        worker_id: usize,
        #[source]
        source: io::Error,
    },

    #[error("Input source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed input at {}:{line}: '{content}' is not an integer", path.display())]
    MalformedInput {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Verification failed: reference sum {expected}, workers reported {actual}")]
    VerificationFailed { expected: i64, actual: i64 },
}

/// Failure to obtain a worker's value from its result channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// End-of-stream before any byte arrived: the worker never sent.
    #[error("channel closed without a value")]
    Empty,

    /// A real read error, or a value cut short by end-of-stream.
    #[error("channel read failed: {0}")]
    ReadFailed(#[source] io::Error),
}

/// Worker-side failure to deliver its result.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("worker {worker_id} failed to write its result: {source}")]
    ChannelWriteFailed {
        worker_id: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker {worker_id} was assigned block {block} outside a sequence of {len}")]
    BlockOutOfRange {
        worker_id: usize,
        block: Block,
        len: usize,
    },
}

/// Result type alias for core operations.
pub type SumResult<T> = std::result::Result<T, SumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_message() {
        let err = SumError::InvalidConfiguration("worker count must be positive".into());
        assert!(err.to_string().contains("worker count must be positive"));
    }

    #[test]
    fn test_spawn_failed_names_worker() {
        let err = SumError::SpawnFailed {
            worker_id: 3,
            source: io::Error::from_raw_os_error(libc::EAGAIN),
        };
        assert!(err.to_string().contains("worker 3"));
    }

    #[test]
    fn test_source_unavailable_names_path() {
        let err = SumError::SourceUnavailable {
            path: PathBuf::from("/data/file9.dat"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/file9.dat"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_channel_error_variants_are_distinct() {
        let empty = ChannelError::Empty.to_string();
        let failed = ChannelError::ReadFailed(io::Error::from_raw_os_error(libc::EIO)).to_string();
        assert_ne!(empty, failed);
        assert!(failed.contains("read failed"));
    }
}
