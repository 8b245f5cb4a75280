//! forksum - Fan-out/fan-in integer summation
//!
//! forksum sums a list of integers by splitting it into contiguous blocks,
//! handing each block to an independent worker, and collecting every worker's
//! partial sum over its own one-shot pipe.
//!
//! # Architecture
//!
//! - **Partitioner**: contiguous blocks, last block absorbs the remainder
//! - **Workers**: forked processes (default) or OS threads behind one trait
//! - **Result channels**: one pipe per worker, exactly one 8-byte value
//! - **Coordinator**: spawn, collect in worker-id order, reap unconditionally
//! - **Aggregation**: complete vs. degraded totals with failed ids flagged

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod partition;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{Coordinator, RunReport};
pub use error::SumError;
pub use partition::Block;
pub use stats::Total;

/// Result type used by the application layer
pub type Result<T> = anyhow::Result<T>;
