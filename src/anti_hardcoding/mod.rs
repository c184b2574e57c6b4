//! Anti-hardcoding heuristics for graded submissions.
//!
//! This module inspects the source text of each graded operation and flags
//! submissions that look correct without implementing anything:
//!
//! - **Stubs**: a short body holding a no-op marker (`pass`, `todo!()`)
//!
//! - **Hardcoded returns**: a short body embedding the value a case expects
//!
//! - **Missing logic**: a body with none of the operation's defining constructs
//!
//! # Example
//!
//! ```ignore
//! use stockgrade::anti_hardcoding::{RedFlagScanner, SubmissionSource};
//! use stockgrade::inventory::Operation;
//!
//! let source = SubmissionSource::from_path("submission.rs")?;
//! let body = source.function(Operation::GetItemStock)?;
//! let flag = RedFlagScanner::default().scan(Operation::GetItemStock, body, "15");
//! ```

pub mod red_flags;
pub mod source_scan;

pub use red_flags::{HeuristicConfig, RedFlag, RedFlagScanner};
pub use source_scan::{extract_function, SubmissionSource};

use serde::{Deserialize, Serialize};

use crate::inventory::Operation;
use crate::test_framework::TestSuite;

/// Red-flag result for one case, computed without running the submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFinding {
    pub section: String,
    pub number: usize,
    pub description: String,
    pub operation: Operation,
    /// Flag raised for this case, if any
    pub flag: Option<RedFlag>,
    /// Set when the function could not be located
    pub error: Option<String>,
}

impl ScanFinding {
    /// Whether the case's source looks genuine.
    pub fn is_clean(&self) -> bool {
        self.flag.is_none() && self.error.is_none()
    }
}

/// Scans `source` against every case of `suites`.
pub fn scan_suites(
    scanner: &RedFlagScanner,
    source: &SubmissionSource,
    suites: &[TestSuite],
) -> Vec<ScanFinding> {
    let mut findings = Vec::new();

    for suite in suites {
        for (index, case) in suite.cases.iter().enumerate() {
            let op = case.operation();
            let (flag, error) = match source.function(op) {
                Ok(body) => (scanner.scan(op, body, &case.expected.literal()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            findings.push(ScanFinding {
                section: suite.section.clone(),
                number: index + 1,
                description: case.description.clone(),
                operation: op,
                flag,
                error,
            });
        }
    }

    findings
}
