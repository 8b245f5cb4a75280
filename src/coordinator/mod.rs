//! Coordinator
//!
//! Owns the whole fan-out/fan-in run:
//!
//! ```text
//! Idle → Partitioning → Spawning → Collecting → Reaping → Done
//! ```
//!
//! - **Partitioning**: split the sequence; a zero worker count aborts here,
//!   before anything is spawned.
//! - **Spawning**: per block, create a result channel and spawn a worker that
//!   owns the write-end. A spawn failure aborts the run, after draining and
//!   reaping the workers already started.
//! - **Collecting**: read every channel in ascending worker-id order. A
//!   failed read is recorded for that worker and collection moves on.
//! - **Reaping**: wait for every spawned worker, unconditionally.
//! - **Done**: the [`RunReport`] holds ordered partials and the total.

use crate::channel::{result_channel, ResultReceiver};
use crate::error::{ChannelError, SumError, SumResult};
use crate::partition::{partition, Block};
use crate::stats::aggregator::ResultAggregator;
use crate::stats::{PartialResult, Total, WorkerExit, WorkerFault};
use crate::util::time::Timer;
use crate::worker::{WorkerHandle, WorkerTask, WorkerUnit};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Coordinator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Partitioning,
    Spawning,
    Collecting,
    Reaping,
    Done,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Partitioning => "partitioning",
            Self::Spawning => "spawning",
            Self::Collecting => "collecting",
            Self::Reaping => "reaping",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Worker backend name ("process" or "thread")
    pub backend: String,
    /// Number of integers in the input sequence
    pub sequence_len: usize,
    /// Blocks in worker-id order
    pub blocks: Vec<Block>,
    /// One record per worker, in worker-id order
    pub partials: Vec<PartialResult>,
    pub total: Total,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn worker_count(&self) -> usize {
        self.blocks.len()
    }

    /// Partial values in worker-id order (`None` for failed workers)
    pub fn partial_values(&self) -> Vec<Option<i64>> {
        self.partials.iter().map(PartialResult::value).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_complete()
    }
}

/// A worker between spawning and reaping
struct Spawned {
    worker_id: usize,
    block: Block,
    receiver: ResultReceiver,
    handle: Box<dyn WorkerHandle>,
}

/// Fan-out/fan-in coordinator
pub struct Coordinator {
    unit: Box<dyn WorkerUnit>,
    worker_count: usize,
    state: CoordinatorState,
}

impl Coordinator {
    pub fn new(unit: Box<dyn WorkerUnit>, worker_count: usize) -> Self {
        Self {
            unit,
            worker_count,
            state: CoordinatorState::Idle,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Run over `data`, timing from this call until the total is computed
    pub fn run(&mut self, data: Arc<[i64]>) -> SumResult<RunReport> {
        self.run_timed(data, Timer::start())
    }

    /// Run over `data` with a timer the caller already started
    ///
    /// Lets the caller include input loading in the measured duration.
    ///
    /// # Errors
    ///
    /// - `SumError::InvalidConfiguration` if the worker count is zero
    /// - `SumError::SpawnFailed` if a channel or worker could not be created
    ///
    /// Per-worker collection failures are not errors; they show up as a
    /// degraded total in the report.
    pub fn run_timed(&mut self, data: Arc<[i64]>, mut timer: Timer) -> SumResult<RunReport> {
        self.transition(CoordinatorState::Partitioning);
        let blocks = match partition(data.len(), self.worker_count) {
            Ok(blocks) => blocks,
            Err(err) => {
                self.transition(CoordinatorState::Idle);
                return Err(err);
            }
        };

        self.transition(CoordinatorState::Spawning);
        let spawned = self.spawn_all(&blocks, &data)?;

        self.transition(CoordinatorState::Collecting);
        let mut aggregator = ResultAggregator::new(blocks.len());
        let mut handles = Vec::with_capacity(spawned.len());

        for worker in spawned {
            match worker.receiver.receive() {
                Ok(value) => {
                    tracing::debug!(worker_id = worker.worker_id, block = %worker.block, value, "Collected partial result");
                    aggregator.record_value(worker.worker_id, worker.block, value);
                }
                Err(err) => {
                    let fault = fault_from(err);
                    tracing::warn!(worker_id = worker.worker_id, fault = %fault, "Worker result missing");
                    aggregator.record_fault(worker.worker_id, worker.block, fault);
                }
            }
            handles.push(worker.handle);
        }

        self.transition(CoordinatorState::Reaping);
        for handle in handles {
            let worker_id = handle.worker_id();
            let exit = reap_one(handle);
            aggregator.record_exit(worker_id, exit);
        }

        let total = aggregator.total();
        let elapsed = timer.stop();
        self.transition(CoordinatorState::Done);

        match &total {
            Total::Complete { sum } => {
                tracing::info!(workers = blocks.len(), total = sum, elapsed_us = elapsed.as_micros() as u64, "Run complete");
            }
            Total::Degraded { sum, failed } => {
                tracing::warn!(workers = blocks.len(), total = sum, failed = ?failed, "Run degraded");
            }
        }

        Ok(RunReport {
            backend: self.unit.name().to_string(),
            sequence_len: data.len(),
            blocks,
            partials: aggregator.into_partials(),
            total,
            elapsed,
        })
    }

    /// Spawn one worker per block, in order
    ///
    /// On failure every worker already started is drained and reaped before
    /// `SpawnFailed` is returned.
    fn spawn_all(&mut self, blocks: &[Block], data: &Arc<[i64]>) -> SumResult<Vec<Spawned>> {
        let mut spawned = Vec::with_capacity(blocks.len());

        for (worker_id, &block) in blocks.iter().enumerate() {
            let result = result_channel().and_then(|(sender, receiver)| {
                let task = WorkerTask::new(worker_id, block, Arc::clone(data));
                self.unit
                    .spawn(task, sender)
                    .map(|handle| Spawned {
                        worker_id,
                        block,
                        receiver,
                        handle,
                    })
            });

            match result {
                Ok(worker) => {
                    tracing::debug!(worker_id, block = %block, backend = self.unit.name(), "Spawned worker");
                    spawned.push(worker);
                }
                Err(source) => {
                    tracing::error!(worker_id, error = %source, "Failed to spawn worker, aborting run");
                    abort(spawned);
                    self.transition(CoordinatorState::Idle);
                    return Err(SumError::SpawnFailed { worker_id, source });
                }
            }
        }

        Ok(spawned)
    }

    fn transition(&mut self, next: CoordinatorState) {
        tracing::debug!(from = %self.state, to = %next, "Coordinator state change");
        self.state = next;
    }
}

/// Drain and reap workers of an aborted run
fn abort(spawned: Vec<Spawned>) {
    for worker in spawned {
        let _ = worker.receiver.receive();
        reap_one(worker.handle);
    }
}

fn reap_one(handle: Box<dyn WorkerHandle>) -> WorkerExit {
    let worker_id = handle.worker_id();

    match handle.reap() {
        Ok(exit) => {
            if !exit.is_success() {
                tracing::warn!(worker_id, exit = %exit, "Worker terminated abnormally");
            }
            exit
        }
        Err(err) => {
            tracing::warn!(worker_id, error = %err, "Failed to reap worker");
            WorkerExit::ReapFailed {
                reason: err.to_string(),
            }
        }
    }
}

fn fault_from(err: ChannelError) -> WorkerFault {
    match err {
        ChannelError::Empty => WorkerFault::ChannelEmpty,
        ChannelError::ReadFailed(source) => WorkerFault::ChannelReadFailed {
            reason: source.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ResultSender;
    use crate::worker::{ProcessWorker, ThreadWorker};
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seq(values: &[i64]) -> Arc<[i64]> {
        values.to_vec().into()
    }

    /// Thread backend that fails to spawn the worker with a given id
    #[derive(Default)]
    struct FailingSpawn {
        fail_at: usize,
        spawned: Arc<AtomicUsize>,
        reaped: Arc<AtomicUsize>,
    }

    impl FailingSpawn {
        fn new(fail_at: usize) -> Self {
            Self {
                fail_at,
                ..Default::default()
            }
        }
    }

    /// Counts reaps of the wrapped handle
    struct CountingHandle {
        inner: Box<dyn WorkerHandle>,
        reaped: Arc<AtomicUsize>,
    }

    impl WorkerHandle for CountingHandle {
        fn worker_id(&self) -> usize {
            self.inner.worker_id()
        }

        fn reap(self: Box<Self>) -> io::Result<WorkerExit> {
            let exit = self.inner.reap();
            self.reaped.fetch_add(1, Ordering::SeqCst);
            exit
        }
    }

    impl WorkerUnit for FailingSpawn {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn spawn(&self, task: WorkerTask, sender: ResultSender) -> io::Result<Box<dyn WorkerHandle>> {
            if task.worker_id == self.fail_at {
                return Err(io::Error::from_raw_os_error(libc::EAGAIN));
            }
            self.spawned.fetch_add(1, Ordering::SeqCst);
            let inner = ThreadWorker.spawn(task, sender)?;
            Ok(Box::new(CountingHandle {
                inner,
                reaped: Arc::clone(&self.reaped),
            }))
        }
    }

    #[test]
    fn test_run_ten_values_four_workers() {
        let mut coordinator = Coordinator::new(Box::new(ThreadWorker), 4);
        let report = coordinator.run(seq(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])).unwrap();

        assert_eq!(
            report.blocks,
            vec![Block::new(0, 2), Block::new(2, 4), Block::new(4, 6), Block::new(6, 10)]
        );
        assert_eq!(report.partial_values(), vec![Some(3), Some(7), Some(11), Some(34)]);
        assert_eq!(report.total, Total::Complete { sum: 55 });
        assert_eq!(coordinator.state(), CoordinatorState::Done);
    }

    #[test]
    fn test_run_with_process_backend() {
        let mut coordinator = Coordinator::new(Box::new(ProcessWorker), 2);
        let report = coordinator.run(seq(&[5])).unwrap();

        assert_eq!(report.blocks, vec![Block::new(0, 1), Block::new(1, 1)]);
        assert_eq!(report.partial_values(), vec![Some(5), Some(0)]);
        assert_eq!(report.total.sum(), 5);
        assert_eq!(report.backend, "process");
        assert!(report.partials.iter().all(|p| p.exit == Some(WorkerExit::Exited { code: 0 })));
    }

    #[test]
    fn test_zero_workers_rejected_before_spawn() {
        let unit = FailingSpawn::new(usize::MAX);
        let spawned = Arc::clone(&unit.spawned);
        let mut coordinator = Coordinator::new(Box::new(unit), 0);

        let err = coordinator.run(seq(&[1, 2])).unwrap_err();
        assert!(matches!(err, SumError::InvalidConfiguration(_)));
        assert_eq!(spawned.load(Ordering::SeqCst), 0);
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }

    #[test]
    fn test_spawn_failure_reaps_started_workers() {
        let unit = FailingSpawn::new(2);
        let spawned = Arc::clone(&unit.spawned);
        let reaped = Arc::clone(&unit.reaped);
        let mut coordinator = Coordinator::new(Box::new(unit), 4);

        let err = coordinator.run(seq(&[1, 2, 3, 4, 5, 6, 7, 8])).unwrap_err();
        assert!(matches!(err, SumError::SpawnFailed { worker_id: 2, .. }));
        assert_eq!(spawned.load(Ordering::SeqCst), 2);
        // Both started workers were reaped before the error came back
        assert_eq!(reaped.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
    }

    #[test]
    fn test_successful_run_reaps_every_worker() {
        let unit = FailingSpawn::new(usize::MAX);
        let reaped = Arc::clone(&unit.reaped);
        let mut coordinator = Coordinator::new(Box::new(unit), 3);

        coordinator.run(seq(&[1, 2, 3, 4])).unwrap();
        assert_eq!(reaped.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_sequence_totals_zero() {
        let mut coordinator = Coordinator::new(Box::new(ThreadWorker), 3);
        let report = coordinator.run(seq(&[])).unwrap();

        assert!(report.blocks.iter().all(Block::is_empty));
        assert_eq!(report.partial_values(), vec![Some(0); 3]);
        assert_eq!(report.total, Total::Complete { sum: 0 });
    }

    #[test]
    fn test_coordinator_is_reusable() {
        let mut coordinator = Coordinator::new(Box::new(ThreadWorker), 2);
        let first = coordinator.run(seq(&[1, 2, 3])).unwrap();
        let second = coordinator.run(seq(&[1, 2, 3])).unwrap();

        assert_eq!(first.partial_values(), second.partial_values());
        assert_eq!(first.total, second.total);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CoordinatorState::Collecting.to_string(), "collecting");
    }
}
