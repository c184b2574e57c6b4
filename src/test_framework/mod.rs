// Test framework module
// Provides case definitions, the built-in suites and per-case verdicts

pub mod case;
pub mod verdict;

pub use case::{
    apply_fixture, baseline_stock, Call, Expected, Fixture, Observed, TestCase, TestSuite,
};
pub use verdict::{FailureReason, Verdict, VerdictStatus};
