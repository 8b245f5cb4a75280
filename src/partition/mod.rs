//! Block partitioning
//!
//! Splits an index range `0..len` into one contiguous block per worker. Every
//! block but the last has `len / workers` elements; the last block absorbs the
//! remainder. When there are more workers than elements, the leading workers
//! get one element each and the rest get empty blocks.

use crate::error::{SumError, SumResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Half-open index range `[start, end)` assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "block start {} past end {}", start, end);
        Self { start, end }
    }

    /// Number of elements in the block
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Partition `sequence_length` elements across `worker_count` workers
///
/// # Errors
///
/// Returns `SumError::InvalidConfiguration` when `worker_count` is zero.
///
/// # Example
///
/// ```
/// use forksum::partition::{partition, Block};
///
/// let blocks = partition(10, 4).unwrap();
/// assert_eq!(
///     blocks,
///     vec![Block::new(0, 2), Block::new(2, 4), Block::new(4, 6), Block::new(6, 10)]
/// );
/// ```
pub fn partition(sequence_length: usize, worker_count: usize) -> SumResult<Vec<Block>> {
    if worker_count == 0 {
        return Err(SumError::InvalidConfiguration(
            "worker count must be at least 1".to_string(),
        ));
    }

    // More workers than elements: one element each, trailing workers idle
    if worker_count > sequence_length {
        return Ok((0..worker_count)
            .map(|worker_id| {
                let start = worker_id.min(sequence_length);
                let end = (worker_id + 1).min(sequence_length);
                Block::new(start, end)
            })
            .collect());
    }

    let block_size = sequence_length / worker_count;

    Ok((0..worker_count)
        .map(|worker_id| {
            let start = worker_id * block_size;
            let end = if worker_id == worker_count - 1 {
                sequence_length // Last worker gets remainder
            } else {
                start + block_size
            };
            Block::new(start, end)
        })
        .collect())
}
