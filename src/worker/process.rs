//! Forked worker processes
//!
//! Each worker is a `fork(2)` child. The child already has the whole sequence
//! in its (copy-on-write) address space, so nothing is serialized on the way
//! in; only the 8-byte result travels back over the pipe.
//!
//! Between `fork` and `_exit` the child runs only [`run_task`], which sums in
//! place and calls `write`/`close`. It never allocates, locks, logs, or runs
//! destructors, so forking from a multi-threaded parent is sound.

use super::{exit_code, run_task, WorkerHandle, WorkerTask, WorkerUnit};
use crate::channel::ResultSender;
use crate::stats::WorkerExit;
use std::io;

/// Worker backend that runs each block in a forked child process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessWorker;

impl WorkerUnit for ProcessWorker {
    fn name(&self) -> &'static str {
        "process"
    }

    fn spawn(&self, task: WorkerTask, sender: ResultSender) -> io::Result<Box<dyn WorkerHandle>> {
        let worker_id = task.worker_id;

        // SAFETY: the child branch below only performs async-signal-safe work
        // (arithmetic on already-mapped memory, write, close, _exit).
        let pid = unsafe { libc::fork() };

        match pid {
            -1 => Err(io::Error::last_os_error()),
            0 => {
                let code = exit_code(&run_task(&task, sender));
                // SAFETY: _exit skips atexit handlers and destructors inherited
                // from the parent, which must not run in the child.
                unsafe { libc::_exit(code) }
            }
            pid => {
                // Parent copy of the write-end closes here
                drop(sender);
                Ok(Box::new(ProcessHandle {
                    worker_id,
                    pid,
                    reaped: false,
                }))
            }
        }
    }
}

/// Handle to a forked worker
#[derive(Debug)]
pub struct ProcessHandle {
    worker_id: usize,
    pid: libc::pid_t,
    reaped: bool,
}

impl ProcessHandle {
    /// Blocking waitpid, retrying on interrupt
    fn wait(&mut self) -> io::Result<WorkerExit> {
        let mut status: libc::c_int = 0;

        loop {
            // SAFETY: status is a valid out-pointer; pid is our own child
            let result = unsafe { libc::waitpid(self.pid, &mut status, 0) };

            if result < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                // The child cannot be waited for again either way
                self.reaped = true;
                return Err(err);
            }

            self.reaped = true;
            return Ok(decode_status(status));
        }
    }
}

impl WorkerHandle for ProcessHandle {
    fn worker_id(&self) -> usize {
        self.worker_id
    }

    fn reap(mut self: Box<Self>) -> io::Result<WorkerExit> {
        self.wait()
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.reaped {
            // Workers are finite; wait so no zombie outlives the handle
            let _ = self.wait();
        }
    }
}

fn decode_status(status: libc::c_int) -> WorkerExit {
    if libc::WIFEXITED(status) {
        WorkerExit::Exited {
            code: libc::WEXITSTATUS(status),
        }
    } else if libc::WIFSIGNALED(status) {
        WorkerExit::Signaled {
            signal: libc::WTERMSIG(status),
        }
    } else {
        WorkerExit::ReapFailed {
            reason: format!("unexpected wait status {:#x}", status),
        }
    }
}
