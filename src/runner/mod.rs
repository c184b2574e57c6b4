//! Grading runner.
//!
//! Drives a submission through the configured suites and records one verdict
//! per case.
//!
//! # Architecture
//!
//! ```text
//! factory ─┬─> randomized probe ──> RandomizedFailureSet
//!          └─> fresh instance per case ──> CaseEvaluator ──> Verdict ──> report.txt
//! ```
//!
//! The runner:
//! 1. Probes one fresh instance with random inputs
//! 2. Evaluates every case on its own fresh instance, in order
//! 3. Appends the verdict lines to the text report
//!
//! # Example
//!
//! ```ignore
//! use stockgrade::runner::{Harness, HarnessConfig};
//! use stockgrade::anti_hardcoding::SubmissionSource;
//! use stockgrade::inventory::InventoryModel;
//! use stockgrade::test_framework::TestSuite;
//!
//! let harness = Harness::new(HarnessConfig::new().with_seed(7))?;
//! let source = SubmissionSource::from_path("submission.rs")?;
//! let report = harness.run_and_record(&TestSuite::defaults(), InventoryModel::new, &source)?;
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod evaluator;
pub mod fuzz;
pub mod report;

pub use config::HarnessConfig;
pub use evaluator::{CaseEvaluator, CaseRef};
pub use fuzz::{probe, ProbeInputs, RandomizedFailureSet};
pub use report::{append_report, SuiteReport};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::Local;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::anti_hardcoding::{RedFlagScanner, SubmissionSource};
use crate::error::{GradeError, SubmissionError};
use crate::inventory::Inventory;
use crate::test_framework::{TestSuite, VerdictStatus};

/// Grades a submission against a list of suites.
pub struct Harness {
    config: HarnessConfig,
    evaluator: CaseEvaluator,
}

impl Harness {
    /// Creates a harness after validating `config`.
    pub fn new(config: HarnessConfig) -> Result<Self, GradeError> {
        config.validate()?;
        let evaluator = CaseEvaluator::new(RedFlagScanner::new(config.heuristics.clone()));
        Ok(Self { config, evaluator })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs the probe and every case; nothing is written to disk.
    ///
    /// `factory` is called once for the probe and once per case.
    pub fn run<I, F>(&self, suites: &[TestSuite], factory: F, source: &SubmissionSource) -> SuiteReport
    where
        I: Inventory,
        F: Fn() -> I,
    {
        let started_at = Local::now();
        let mut rng = self.create_rng();
        let inputs = ProbeInputs::generate(&mut rng);
        let randomized_failures = probe(factory(), &inputs);

        if !randomized_failures.is_empty() {
            let failed: Vec<String> = randomized_failures.iter().map(|op| op.to_string()).collect();
            warn!(operations = ?failed, "Randomized probe failed");
        }

        let mut report = SuiteReport::new(started_at, randomized_failures);

        for suite in suites {
            info!(section = %suite.section, cases = suite.cases.len(), "Evaluating section");
            for (index, case) in suite.cases.iter().enumerate() {
                let at = CaseRef {
                    section: &suite.section,
                    number: index + 1,
                };
                let verdict = self.evaluator.evaluate(
                    at,
                    case,
                    factory(),
                    source,
                    &report.randomized_failures,
                );
                if self.config.echo {
                    println!("{}", verdict);
                }
                report.record(verdict);
            }
        }

        report.finish();
        info!(
            passed = report.passed(),
            failed = report.count(VerdictStatus::Failed),
            crashed = report.count(VerdictStatus::Crashed),
            "Grading finished"
        );
        report
    }

    /// Runs the suites and appends the result to the configured report file.
    pub fn run_and_record<I, F>(
        &self,
        suites: &[TestSuite],
        factory: F,
        source: &SubmissionSource,
    ) -> Result<SuiteReport, GradeError>
    where
        I: Inventory,
        F: Fn() -> I,
    {
        let report = self.run(suites, factory, source);
        append_report(&self.config.report_path, &report)?;
        info!(path = %self.config.report_path.display(), "Report appended");
        Ok(report)
    }

    /// Creates the probe RNG.
    fn create_rng(&self) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

/// Runs submission code, turning a panic into [`SubmissionError::Panicked`].
pub(crate) fn guarded<T, E, F>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<SubmissionError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(SubmissionError::Panicked(panic_message(payload.as_ref())).into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
