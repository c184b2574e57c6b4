//! Suite reports and the appended text report file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::fuzz::RandomizedFailureSet;
use crate::error::GradeError;
use crate::test_framework::{Verdict, VerdictStatus};

/// Outcome of one suite execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// When the run started; used for the report header
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Operations vetoed by the randomized probe
    pub randomized_failures: RandomizedFailureSet,
    /// One verdict per case, in execution order
    pub verdicts: Vec<Verdict>,
}

impl SuiteReport {
    pub fn new(started_at: DateTime<Local>, randomized_failures: RandomizedFailureSet) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            randomized_failures,
            verdicts: Vec::new(),
        }
    }

    /// Appends a verdict.
    pub fn record(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Local::now();
    }

    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn count(&self, status: VerdictStatus) -> usize {
        self.verdicts.iter().filter(|v| v.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(VerdictStatus::Passed)
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// Pass rate as a percentage.
    pub fn pass_rate(&self) -> f64 {
        if self.verdicts.is_empty() {
            100.0
        } else {
            (self.passed() as f64 / self.total() as f64) * 100.0
        }
    }

    /// Header line written before the verdict lines.
    pub fn header(&self) -> String {
        format!(
            "=== Inventory Management Test Run at {} ===",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{}/{} passed, {} failed, {} crashed ({:.1}%)",
            self.passed(),
            self.total(),
            self.count(VerdictStatus::Failed),
            self.count(VerdictStatus::Crashed),
            self.pass_rate()
        )
    }

    /// Report block: a blank line, the header, then one line per verdict.
    pub fn to_text(&self) -> String {
        let mut lines = vec![String::new(), self.header()];
        lines.extend(self.verdicts.iter().map(|v| v.to_string()));
        lines.join("\n") + "\n"
    }
}

/// Appends `report` to the file at `path`, creating it and its parent directory if needed.
///
/// Existing contents are never overwritten.
pub fn append_report(path: &Path, report: &SuiteReport) -> Result<(), GradeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(report.to_text().as_bytes())?;
    Ok(())
}
