//! Per-case verdicts and their report line rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::anti_hardcoding::RedFlag;
use crate::inventory::Operation;

/// Outcome class of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Passed,
    Failed,
    Crashed,
}

impl VerdictStatus {
    /// Leading glyph of a report line.
    pub fn glyph(&self) -> &'static str {
        match self {
            VerdictStatus::Passed => "✅",
            VerdictStatus::Failed | VerdictStatus::Crashed => "❌",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictStatus::Passed => write!(f, "Passed"),
            VerdictStatus::Failed => write!(f, "Failed"),
            VerdictStatus::Crashed => write!(f, "Crashed"),
        }
    }
}

/// Why a case failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The submission returned the wrong value.
    OutputMismatch,
    /// A source heuristic fired.
    RedFlag(RedFlag),
    /// The operation failed the randomized probe.
    RandomizedFailure(Operation),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::OutputMismatch => write!(f, "Output mismatch"),
            FailureReason::RedFlag(flag) => write!(f, "{}", flag),
            FailureReason::RandomizedFailure(op) => write!(f, "Randomized test failed for {}", op),
        }
    }
}

/// Result of evaluating one case. Built once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub section: String,
    /// 1-based position within the section
    pub number: usize,
    pub description: String,
    pub operation: Operation,
    pub status: VerdictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_flag: Option<RedFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Verdict {
    /// A passing verdict.
    pub fn passed(section: &str, number: usize, description: &str, operation: Operation) -> Self {
        Self {
            section: section.to_string(),
            number,
            description: description.to_string(),
            operation,
            status: VerdictStatus::Passed,
            reason: None,
            red_flag: None,
            expected: None,
            actual: None,
        }
    }

    /// A failing verdict carrying the deciding reason.
    pub fn failed(
        section: &str,
        number: usize,
        description: &str,
        operation: Operation,
        reason: FailureReason,
    ) -> Self {
        let red_flag = match &reason {
            FailureReason::RedFlag(flag) => Some(flag.clone()),
            _ => None,
        };
        Self {
            status: VerdictStatus::Failed,
            reason: Some(reason.to_string()),
            red_flag,
            ..Self::passed(section, number, description, operation)
        }
    }

    /// A verdict for a case whose setup, scan or call raised an error.
    pub fn crashed(
        section: &str,
        number: usize,
        description: &str,
        operation: Operation,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            status: VerdictStatus::Crashed,
            reason: Some(error.to_string()),
            ..Self::passed(section, number, description, operation)
        }
    }

    /// Attaches the expected and observed values.
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status == VerdictStatus::Passed
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} Test Case {} {}: {}",
            self.status.glyph(),
            self.section,
            self.number,
            self.status,
            self.description
        )?;
        if let Some(reason) = &self.reason {
            write!(f, " | Reason: {}", reason)?;
        }
        Ok(())
    }
}
