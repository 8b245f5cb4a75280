//! Thread-backed workers
//!
//! Same contract as the process backend, with a named OS thread as the
//! execution context. The sequence is shared through the task's `Arc`.

use super::{exit_code, run_task, WorkerHandle, WorkerTask, WorkerUnit};
use crate::channel::ResultSender;
use crate::error::WorkerError;
use crate::stats::WorkerExit;
use std::io;
use std::thread::{self, JoinHandle};

/// Worker backend that runs each block on its own thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWorker;

impl WorkerUnit for ThreadWorker {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn spawn(&self, task: WorkerTask, sender: ResultSender) -> io::Result<Box<dyn WorkerHandle>> {
        let worker_id = task.worker_id;

        // On spawn failure the closure, and the sender with it, is dropped
        let handle = thread::Builder::new()
            .name(format!("forksum-worker-{}", worker_id))
            .spawn(move || run_task(&task, sender))?;

        Ok(Box::new(ThreadHandle { worker_id, handle }))
    }
}

/// Handle to a worker thread
#[derive(Debug)]
pub struct ThreadHandle {
    worker_id: usize,
    handle: JoinHandle<Result<i64, WorkerError>>,
}

impl WorkerHandle for ThreadHandle {
    fn worker_id(&self) -> usize {
        self.worker_id
    }

    fn reap(self: Box<Self>) -> io::Result<WorkerExit> {
        let ThreadHandle { worker_id, handle } = *self;

        match handle.join() {
            Ok(result) => {
                if let Err(ref err) = result {
                    tracing::debug!(worker_id, error = %err, "Worker thread failed");
                }
                Ok(WorkerExit::Exited {
                    code: exit_code(&result),
                })
            }
            Err(_) => Ok(WorkerExit::Panicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::result_channel;
    use crate::partition::Block;
    use crate::worker::EXIT_WRITE_FAILED;

    #[test]
    fn test_thread_worker_sends_partial_sum() {
        let (tx, rx) = result_channel().unwrap();
        let data = vec![5, -2, 9].into();
        let handle = ThreadWorker.spawn(WorkerTask::new(1, Block::new(0, 3), data), tx).unwrap();

        assert_eq!(handle.worker_id(), 1);
        assert_eq!(rx.receive().unwrap(), 12);
        assert!(handle.reap().unwrap().is_success());
    }

    #[test]
    fn test_thread_worker_write_failure_exit_code() {
        let (tx, rx) = result_channel().unwrap();
        drop(rx);

        let data = vec![1].into();
        let handle = ThreadWorker.spawn(WorkerTask::new(0, Block::new(0, 1), data), tx).unwrap();
        assert_eq!(handle.reap().unwrap(), WorkerExit::Exited { code: EXIT_WRITE_FAILED });
    }

    #[test]
    fn test_thread_worker_name() {
        assert_eq!(ThreadWorker.name(), "thread");
    }
}
