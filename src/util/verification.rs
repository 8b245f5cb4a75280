//! Total verification
//!
//! Cross-checks a run's total against a reference sum computed in-process
//! with rayon. Only complete totals are compared; a degraded total is
//! already known to be short and is reported as skipped.

use crate::error::{SumError, SumResult};
use crate::stats::Total;
use rayon::prelude::*;

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Total matches the reference sum
    Success { sum: i64 },
    /// Total was degraded, nothing to compare
    Skipped { failed: Vec<usize> },
}

/// Wrapping sum of the whole sequence, computed in parallel
pub fn reference_sum(data: &[i64]) -> i64 {
    data.par_iter()
        .fold(|| 0i64, |acc, &v| acc.wrapping_add(v))
        .reduce(|| 0i64, i64::wrapping_add)
}

/// Compare a run total with the reference sum of `data`
///
/// # Errors
///
/// Returns `SumError::VerificationFailed` if a complete total disagrees.
pub fn verify_total(data: &[i64], total: &Total) -> SumResult<VerificationResult> {
    match total {
        Total::Complete { sum } => {
            let expected = reference_sum(data);
            if expected != *sum {
                return Err(SumError::VerificationFailed {
                    expected,
                    actual: *sum,
                });
            }
            Ok(VerificationResult::Success { sum: *sum })
        }
        Total::Degraded { failed, .. } => Ok(VerificationResult::Skipped {
            failed: failed.clone(),
        }),
    }
}
