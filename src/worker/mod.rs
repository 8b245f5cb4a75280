//! Worker units
//!
//! A worker unit is an isolated execution context that sums one block of the
//! shared sequence, sends the result over its own [`ResultSender`], and
//! terminates. The [`WorkerUnit`] trait hides what kind of context that is:
//!
//! - [`ProcessWorker`]: a forked child process (the default)
//! - [`ThreadWorker`]: a named OS thread
//!
//! Either way the contract is the same: the write-end is moved into the
//! worker on spawn, exactly one value is sent, and the returned
//! [`WorkerHandle`] must be reaped exactly once.
//!
//! # Example
//!
//! ```
//! use forksum::channel::result_channel;
//! use forksum::partition::Block;
//! use forksum::worker::{ThreadWorker, WorkerTask, WorkerUnit};
//! use std::sync::Arc;
//!
//! let data: Arc<[i64]> = vec![1, 2, 3, 4].into();
//! let (tx, rx) = result_channel()?;
//!
//! let handle = ThreadWorker.spawn(WorkerTask::new(0, Block::new(1, 4), data), tx)?;
//! assert_eq!(rx.receive().unwrap(), 9);
//! assert!(handle.reap()?.is_success());
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod process;
pub mod thread;

pub use process::ProcessWorker;
pub use thread::ThreadWorker;

use crate::channel::ResultSender;
use crate::error::WorkerError;
use crate::partition::Block;
use crate::stats::WorkerExit;
use std::io;
use std::sync::Arc;

/// Exit code of a worker that sent its result
pub const EXIT_OK: i32 = 0;

/// Exit code of a worker whose channel write failed
pub const EXIT_WRITE_FAILED: i32 = 3;

/// Exit code of a worker handed a block outside the sequence
pub const EXIT_BAD_BLOCK: i32 = 4;

/// Everything a worker needs to compute its partial result
#[derive(Debug, Clone)]
pub struct WorkerTask {
    pub worker_id: usize,
    pub block: Block,
    /// Full sequence, shared read-only
    pub data: Arc<[i64]>,
}

impl WorkerTask {
    pub fn new(worker_id: usize, block: Block, data: Arc<[i64]>) -> Self {
        Self {
            worker_id,
            block,
            data,
        }
    }

    /// Sum of this task's block, or `None` if the block is out of range
    pub fn partial_sum(&self) -> Option<i64> {
        self.data.get(self.block.range()).map(sum_block)
    }
}

/// Sum a block of integers (wrapping, never panics; empty → 0)
///
/// # Examples
///
/// ```
/// use forksum::worker::sum_block;
///
/// assert_eq!(sum_block(&[1, 2, 3]), 6);
/// assert_eq!(sum_block(&[]), 0);
/// ```
#[inline]
pub fn sum_block(values: &[i64]) -> i64 {
    values.iter().fold(0i64, |acc, &v| acc.wrapping_add(v))
}

/// Worker body shared by every backend: sum, send once, close
///
/// Does not allocate or log, so it is safe to run in a forked child.
pub fn run_task(task: &WorkerTask, sender: ResultSender) -> Result<i64, WorkerError> {
    let value = task.partial_sum().ok_or(WorkerError::BlockOutOfRange {
        worker_id: task.worker_id,
        block: task.block,
        len: task.data.len(),
    })?;

    sender
        .send(value)
        .map_err(|source| WorkerError::ChannelWriteFailed {
            worker_id: task.worker_id,
            source,
        })?;

    Ok(value)
}

/// Exit code reported by a worker that finished `run_task` with this result
pub fn exit_code(result: &Result<i64, WorkerError>) -> i32 {
    match result {
        Ok(_) => EXIT_OK,
        Err(WorkerError::ChannelWriteFailed { .. }) => EXIT_WRITE_FAILED,
        Err(WorkerError::BlockOutOfRange { .. }) => EXIT_BAD_BLOCK,
    }
}

/// A way of starting isolated worker contexts
pub trait WorkerUnit: Send + Sync {
    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;

    /// Start a worker for `task` that sends its result through `sender`
    ///
    /// The write-end is moved in: by the time this returns, the caller holds
    /// no copy of it, so the paired receiver sees end-of-stream as soon as
    /// the worker is done.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the context could not be created. The sender
    /// is closed in that case.
    fn spawn(&self, task: WorkerTask, sender: ResultSender) -> io::Result<Box<dyn WorkerHandle>>;
}

/// A running worker owned by the coordinator
pub trait WorkerHandle: Send {
    fn worker_id(&self) -> usize;

    /// Block until the worker has terminated and report how it ended
    fn reap(self: Box<Self>) -> io::Result<WorkerExit>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::result_channel;
    use crate::error::ChannelError;

    fn task(block: Block) -> WorkerTask {
        WorkerTask::new(0, block, vec![1, 2, 3, 4, 5].into())
    }

    #[test]
    fn test_sum_block_wraps_instead_of_panicking() {
        assert_eq!(sum_block(&[i64::MAX, 1]), i64::MIN);
    }

    #[test]
    fn test_partial_sum_empty_block() {
        assert_eq!(task(Block::new(5, 5)).partial_sum(), Some(0));
    }

    #[test]
    fn test_partial_sum_out_of_range() {
        assert_eq!(task(Block::new(3, 9)).partial_sum(), None);
    }

    #[test]
    fn test_run_task_sends_once() {
        let (tx, rx) = result_channel().unwrap();
        let result = run_task(&task(Block::new(0, 5)), tx);
        assert_eq!(result.unwrap(), 15);
        assert_eq!(rx.receive().unwrap(), 15);
    }

    #[test]
    fn test_run_task_write_failure() {
        let (tx, rx) = result_channel().unwrap();
        drop(rx);

        let result = run_task(&task(Block::new(0, 2)), tx);
        assert!(matches!(result, Err(WorkerError::ChannelWriteFailed { worker_id: 0, .. })));
        assert_eq!(exit_code(&result), EXIT_WRITE_FAILED);
    }

    #[test]
    fn test_run_task_bad_block_sends_nothing() {
        let (tx, rx) = result_channel().unwrap();
        let result = run_task(&task(Block::new(4, 8)), tx);
        assert_eq!(exit_code(&result), EXIT_BAD_BLOCK);
        assert!(matches!(rx.receive(), Err(ChannelError::Empty)));
    }
}
