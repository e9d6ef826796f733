// src/crawl/report.rs
// =============================================================================
// Summary of a finished crawl.
//
// A crawl "succeeds" when it runs until nothing is left to fetch, not when
// nothing failed, so failures are collected here instead of aborting.
// The report can be printed as a table or serialized to JSON.
// =============================================================================

use serde::Serialize;
use std::time::Duration;

use super::engine::{CompletedTarget, TargetOutcome};

/// Where a target's processing gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Network error or HTTP status >= 400
    Fetch,
    /// Fetched fine, but the file could not be written
    Persist,
    /// The worker task itself died (panic)
    Worker,
}

/// One target that did not make it into the mirror
#[derive(Debug, Clone, Serialize)]
pub struct FailedTarget {
    pub url: String,
    pub stage: FailureStage,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Targets that passed admission and were handed to a worker
    pub admitted: usize,
    /// Files written to the mirror
    pub saved: usize,
    /// Total bytes written
    pub bytes_written: u64,
    /// Pages whose markup could not be processed and were saved unmodified
    pub parse_fallbacks: usize,
    /// Discoveries dropped because the URL was already claimed
    pub duplicates_skipped: usize,
    /// Page links dropped because they were deeper than the limit
    pub beyond_depth: usize,
    /// Discoveries dropped because the operator cancelled the crawl
    pub skipped_after_cancel: usize,
    /// Every failed target, in completion order
    pub failures: Vec<FailedTarget>,
    /// Wall-clock duration of the crawl
    pub elapsed_secs: f64,
}

impl CrawlReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub(super) fn record(&mut self, completed: &CompletedTarget) {
        if completed.parse_fallback {
            self.parse_fallbacks += 1;
        }
        match &completed.outcome {
            TargetOutcome::Saved(file) => {
                self.saved += 1;
                self.bytes_written += file.bytes;
            }
            TargetOutcome::Failed { stage, message } => self.failures.push(FailedTarget {
                url: completed.target.url().to_string(),
                stage: *stage,
                message: message.clone(),
            }),
        }
    }

    pub(super) fn record_worker_failure(&mut self, message: String) {
        self.failures.push(FailedTarget {
            url: String::new(),
            stage: FailureStage::Worker,
            message,
        });
    }

    pub(super) fn finish(&mut self, elapsed: Duration) {
        self.elapsed_secs = elapsed.as_secs_f64();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_stage_names() {
        let mut report = CrawlReport::default();
        report.record_worker_failure("task panicked".to_string());

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["failures"][0]["stage"], "worker");
        assert_eq!(report.failed(), 1);
    }
}
