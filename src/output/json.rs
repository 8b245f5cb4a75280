//! JSON output formatting
//!
//! Serializes a [`RunReport`] with per-worker detail, the total and whether it
//! is degraded, and the elapsed time in both microseconds and human form.

use crate::coordinator::RunReport;
use crate::partition::Block;
use crate::stats::{PartialOutcome, WorkerExit, WorkerFault};
use crate::util::time::format_duration;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            human: format_duration(d),
        }
    }
}

/// One worker's entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWorker {
    pub worker_id: usize,
    pub block: Block,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<WorkerFault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<WorkerExit>,
}

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub started_at: String,
    pub backend: String,
    pub worker_count: usize,
    pub sequence_len: usize,
    pub workers: Vec<JsonWorker>,
    pub total: i64,
    pub complete: bool,
    pub failed_workers: Vec<usize>,
    pub elapsed: JsonDuration,
}

impl JsonReport {
    pub fn from_report(report: &RunReport, started_at: DateTime<Local>) -> Self {
        let workers = report
            .partials
            .iter()
            .map(|partial| {
                let (result, fault) = match &partial.outcome {
                    PartialOutcome::Value(value) => (Some(*value), None),
                    PartialOutcome::Failed(fault) => (None, Some(fault.clone())),
                };
                JsonWorker {
                    worker_id: partial.worker_id,
                    block: partial.block,
                    result,
                    fault,
                    exit: partial.exit.clone(),
                }
            })
            .collect();

        Self {
            started_at: started_at.to_rfc3339(),
            backend: report.backend.clone(),
            worker_count: report.worker_count(),
            sequence_len: report.sequence_len,
            workers,
            total: report.total.sum(),
            complete: report.total.is_complete(),
            failed_workers: report.total.failed_workers().to_vec(),
            elapsed: JsonDuration::from_duration(report.elapsed),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize JSON report")
    }
}

/// Write the JSON report to a file
pub fn write_json_report(path: &Path, report: &JsonReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON output file: {}", path.display()))?;

    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{PartialResult, Total};
    use tempfile::TempDir;

    fn degraded_report() -> RunReport {
        RunReport {
            backend: "thread".to_string(),
            sequence_len: 2,
            blocks: vec![Block::new(0, 1), Block::new(1, 2)],
            partials: vec![
                PartialResult {
                    worker_id: 0,
                    block: Block::new(0, 1),
                    outcome: PartialOutcome::Value(5),
                    exit: Some(WorkerExit::Exited { code: 0 }),
                },
                PartialResult {
                    worker_id: 1,
                    block: Block::new(1, 2),
                    outcome: PartialOutcome::Failed(WorkerFault::ChannelEmpty),
                    exit: Some(WorkerExit::Exited { code: 3 }),
                },
            ],
            total: Total::Degraded { sum: 5, failed: vec![1] },
            elapsed: Duration::from_micros(250),
        }
    }

    #[test]
    fn test_json_report_fields() {
        let json = JsonReport::from_report(&degraded_report(), Local::now());

        assert_eq!(json.worker_count, 2);
        assert_eq!(json.total, 5);
        assert!(!json.complete);
        assert_eq!(json.failed_workers, vec![1]);
        assert_eq!(json.workers[0].result, Some(5));
        assert_eq!(json.workers[1].fault, Some(WorkerFault::ChannelEmpty));
        assert_eq!(json.elapsed.micros, 250);
    }

    #[test]
    fn test_json_string_shape() {
        let text = JsonReport::from_report(&degraded_report(), Local::now())
            .to_json_string()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["workers"][1]["fault"]["kind"], "channel_empty");
        assert_eq!(value["workers"][0]["block"]["end"], 1);
        assert!(value["workers"][1].get("result").is_none());
    }

    #[test]
    fn test_write_json_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let report = JsonReport::from_report(&degraded_report(), Local::now());

        write_json_report(&path, &report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: JsonReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.total, 5);
    }
}
