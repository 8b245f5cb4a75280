//! Per-worker results and run totals
//!
//! Every worker id gets exactly one [`PartialResult`]: either the value it
//! sent, or the [`WorkerFault`] that kept the coordinator from reading one.
//! Reaping adds the worker's [`WorkerExit`] to the same record.
//!
//! The run total is [`Total::Complete`] only when every worker id contributed
//! a value. Otherwise it is [`Total::Degraded`] and names the missing ids, so
//! a short total is never mistaken for a trustworthy one.

pub mod aggregator;

use crate::partition::Block;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a worker's value could not be collected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerFault {
    /// The channel reached end-of-stream without a value
    ChannelEmpty,
    /// The channel read failed or delivered a truncated value
    ChannelReadFailed { reason: String },
}

impl fmt::Display for WorkerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelEmpty => write!(f, "channel empty"),
            Self::ChannelReadFailed { reason } => write!(f, "channel read failed: {}", reason),
        }
    }
}

/// How a worker terminated, as observed when it was reaped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerExit {
    /// Normal termination with an exit code (0 = sent its result)
    Exited { code: i32 },
    /// Process killed by a signal
    Signaled { signal: i32 },
    /// Thread worker panicked
    Panicked,
    /// Waiting for the worker failed
    ReapFailed { reason: String },
}

impl WorkerExit {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited { code: 0 })
    }
}

impl fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited { code } => write!(f, "exited with code {}", code),
            Self::Signaled { signal } => write!(f, "killed by signal {}", signal),
            Self::Panicked => write!(f, "panicked"),
            Self::ReapFailed { reason } => write!(f, "reap failed: {}", reason),
        }
    }
}

/// What the coordinator got from one worker's channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialOutcome {
    Value(i64),
    Failed(WorkerFault),
}

/// One worker's record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    pub worker_id: usize,
    pub block: Block,
    pub outcome: PartialOutcome,
    /// Filled in by the reap step
    pub exit: Option<WorkerExit>,
}

impl PartialResult {
    pub fn value(&self) -> Option<i64> {
        match self.outcome {
            PartialOutcome::Value(value) => Some(value),
            PartialOutcome::Failed(_) => None,
        }
    }

    pub fn fault(&self) -> Option<&WorkerFault> {
        match &self.outcome {
            PartialOutcome::Value(_) => None,
            PartialOutcome::Failed(fault) => Some(fault),
        }
    }
}

/// Sum of all partial results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Total {
    /// Every worker contributed
    Complete { sum: i64 },
    /// Sum of the workers that did report; `failed` lists the ones that did not
    Degraded { sum: i64, failed: Vec<usize> },
}

impl Total {
    pub fn sum(&self) -> i64 {
        match self {
            Self::Complete { sum } | Self::Degraded { sum, .. } => *sum,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Worker ids missing from the sum (empty when complete)
    pub fn failed_workers(&self) -> &[usize] {
        match self {
            Self::Complete { .. } => &[],
            Self::Degraded { failed, .. } => failed,
        }
    }
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete { sum } => write!(f, "{}", sum),
            Self::Degraded { sum, failed } => {
                write!(f, "{} (DEGRADED: workers {:?} did not report)", sum, failed)
            }
        }
    }
}
