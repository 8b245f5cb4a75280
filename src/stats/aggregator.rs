//! Partial result aggregation
//!
//! Collects one record per worker id and derives the run total. Records are
//! kept in a `BTreeMap`, so iteration is always in ascending worker-id order
//! no matter the order in which workers finished.
//!
//! # Example
//!
//! ```
//! use forksum::partition::Block;
//! use forksum::stats::{aggregator::ResultAggregator, Total, WorkerFault};
//!
//! let mut aggregator = ResultAggregator::new(3);
//! aggregator.record_value(0, Block::new(0, 1), 5);
//! aggregator.record_fault(1, Block::new(1, 2), WorkerFault::ChannelEmpty);
//! aggregator.record_value(2, Block::new(2, 3), 7);
//!
//! assert_eq!(aggregator.total(), Total::Degraded { sum: 12, failed: vec![1] });
//! ```

use super::{PartialOutcome, PartialResult, Total, WorkerExit, WorkerFault};
use crate::partition::Block;
use std::collections::BTreeMap;

/// Aggregator for per-worker partial results
#[derive(Debug)]
pub struct ResultAggregator {
    /// Number of workers the run was partitioned for
    expected_workers: usize,

    /// Per-worker records (worker_id → record)
    workers: BTreeMap<usize, PartialResult>,
}

impl ResultAggregator {
    pub fn new(expected_workers: usize) -> Self {
        Self {
            expected_workers,
            workers: BTreeMap::new(),
        }
    }

    /// Record the value a worker delivered
    pub fn record_value(&mut self, worker_id: usize, block: Block, value: i64) {
        self.record(worker_id, block, PartialOutcome::Value(value));
    }

    /// Record that a worker's value could not be collected
    pub fn record_fault(&mut self, worker_id: usize, block: Block, fault: WorkerFault) {
        self.record(worker_id, block, PartialOutcome::Failed(fault));
    }

    fn record(&mut self, worker_id: usize, block: Block, outcome: PartialOutcome) {
        let exit = self.workers.remove(&worker_id).and_then(|r| r.exit);
        self.workers.insert(
            worker_id,
            PartialResult {
                worker_id,
                block,
                outcome,
                exit,
            },
        );
    }

    /// Attach the reap status to an existing record
    ///
    /// Returns false if the worker has no record yet.
    pub fn record_exit(&mut self, worker_id: usize, exit: WorkerExit) -> bool {
        match self.workers.get_mut(&worker_id) {
            Some(record) => {
                record.exit = Some(exit);
                true
            }
            None => false,
        }
    }

    /// Compute the total
    ///
    /// Complete only when every expected worker id has a value. Ids with a
    /// fault, or with no record at all, are listed as failed.
    pub fn total(&self) -> Total {
        let mut sum: i64 = 0;
        let mut failed = Vec::new();

        for worker_id in 0..self.expected_workers {
            match self.workers.get(&worker_id).and_then(PartialResult::value) {
                Some(value) => sum = sum.wrapping_add(value),
                None => failed.push(worker_id),
            }
        }

        if failed.is_empty() {
            Total::Complete { sum }
        } else {
            Total::Degraded { sum, failed }
        }
    }

    /// Records in ascending worker-id order
    pub fn into_partials(self) -> Vec<PartialResult> {
        self.workers.into_values().collect()
    }
}
