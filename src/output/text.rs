//! Human-readable text output

use crate::coordinator::RunReport;
use crate::stats::{PartialOutcome, Total};
use crate::util::time::{calculate_rate, format_duration, format_rate};
use std::fmt::Write;

/// Render a run report as text
///
/// One line per worker in worker-id order, then the total and the duration.
/// Failed workers are listed explicitly instead of being left out.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();

    for partial in &report.partials {
        match &partial.outcome {
            PartialOutcome::Value(value) => {
                let _ = writeln!(out, "Worker {} result: {}", partial.worker_id, value);
            }
            PartialOutcome::Failed(fault) => {
                let _ = writeln!(out, "Worker {} result: FAILED ({})", partial.worker_id, fault);
            }
        }
    }

    match &report.total {
        Total::Complete { sum } => {
            let _ = writeln!(out, "Total: {}", sum);
        }
        Total::Degraded { sum, failed } => {
            let _ = writeln!(
                out,
                "Total: {} (DEGRADED: missing results from workers {})",
                sum,
                join_ids(failed)
            );
        }
    }

    let _ = writeln!(
        out,
        "Duration: {} microseconds ({})",
        report.elapsed.as_micros(),
        format_duration(report.elapsed)
    );

    out
}

/// Render the run header with partition details (printed with --debug)
pub fn render_details(report: &RunReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Backend: {}", report.backend);
    let _ = writeln!(out, "Workers: {}", report.worker_count());
    let _ = writeln!(out, "Integers: {}", report.sequence_len);
    for (worker_id, block) in report.blocks.iter().enumerate() {
        let _ = writeln!(out, "  Worker {}: block {} ({} values)", worker_id, block, block.len());
    }
    let rate = calculate_rate(report.sequence_len, report.elapsed);
    let _ = writeln!(out, "Rate: {} ints/s", format_rate(rate));

    out
}

/// Print a run report to stdout
pub fn print_report(report: &RunReport) {
    print!("{}", render_report(report));
}

fn join_ids(ids: &[usize]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
