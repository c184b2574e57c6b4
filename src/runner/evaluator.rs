//! Heuristic case evaluator.
//!
//! Combines behavioural checking with the red-flag scan: a case passes only
//! when the submission returns the expected value and its source raises no
//! flag and its operation survived the randomized probe.

use tracing::debug;

use super::fuzz::RandomizedFailureSet;
use super::guarded;
use crate::anti_hardcoding::{RedFlagScanner, SubmissionSource};
use crate::error::GradeError;
use crate::inventory::Inventory;
use crate::test_framework::{apply_fixture, FailureReason, Observed, TestCase, Verdict};

/// Position of a case inside its suite.
#[derive(Debug, Clone, Copy)]
pub struct CaseRef<'a> {
    pub section: &'a str,
    /// 1-based
    pub number: usize,
}

/// Evaluates single cases against a submission.
#[derive(Debug, Clone, Default)]
pub struct CaseEvaluator {
    scanner: RedFlagScanner,
}

impl CaseEvaluator {
    pub fn new(scanner: RedFlagScanner) -> Self {
        Self { scanner }
    }

    pub fn scanner(&self) -> &RedFlagScanner {
        &self.scanner
    }

    /// Evaluate `case` on a fresh `inventory`.
    ///
    /// Errors and panics raised by the fixture, setup calls, source lookup or
    /// the graded call produce a `Crashed` verdict.
    pub fn evaluate<I: Inventory>(
        &self,
        at: CaseRef<'_>,
        case: &TestCase,
        inventory: I,
        source: &SubmissionSource,
        randomized_failures: &RandomizedFailureSet,
    ) -> Verdict {
        let op = case.operation();
        let mut inventory = inventory;

        let outcome = guarded(|| self.run_case(case, &mut inventory, source, randomized_failures));

        let (observed, reason) = match outcome {
            Ok(result) => result,
            Err(e) => {
                let message = match e {
                    GradeError::Submission(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                debug!(section = at.section, case = at.number, error = %message, "Case crashed");
                return Verdict::crashed(at.section, at.number, &case.description, op, message);
            }
        };

        let matched = case.expected.matches(&observed);
        let reason = match (reason, matched) {
            (Some(reason), _) => Some(reason),
            (None, false) => Some(FailureReason::OutputMismatch),
            (None, true) => None,
        };

        match reason {
            None => Verdict::passed(at.section, at.number, &case.description, op),
            Some(reason) => {
                debug!(
                    section = at.section,
                    case = at.number,
                    %reason,
                    output_matched = matched,
                    "Case failed"
                );
                Verdict::failed(at.section, at.number, &case.description, op, reason)
                    .with_comparison(case.expected.to_string(), observed.to_string())
            }
        }
    }

    /// Steps 1 to 5: fixture, setup, scan, veto, call.
    fn run_case<I: Inventory>(
        &self,
        case: &TestCase,
        inventory: &mut I,
        source: &SubmissionSource,
        randomized_failures: &RandomizedFailureSet,
    ) -> Result<(Observed, Option<FailureReason>), GradeError> {
        let op = case.operation();

        apply_fixture(case.fixture, inventory)?;
        for call in &case.setup {
            call.apply(inventory)?;
        }

        let body = source.function(op)?;
        let mut reason = self
            .scanner
            .scan(op, body, &case.expected.literal())
            .map(FailureReason::RedFlag);

        if randomized_failures.contains(op) {
            reason = Some(FailureReason::RandomizedFailure(op));
        }

        let observed = case.call.apply(inventory)?;
        Ok((observed, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anti_hardcoding::RedFlag;
    use crate::error::SubmissionError;
    use crate::inventory::{InventoryModel, Operation, StockMap, REFERENCE_SOURCE};
    use crate::test_framework::{Call, Expected, TestSuite, VerdictStatus};

    const AT: CaseRef<'static> = CaseRef {
        section: "Visible",
        number: 1,
    };

    /// Returns a constant stock and empty mappings; listing is unimplemented.
    struct ConstantStock;

    impl Inventory for ConstantStock {
        fn add_item(&mut self, _name: &str, _quantity: u64) -> Result<StockMap, SubmissionError> {
            Ok(StockMap::new())
        }
        fn update_stock(&mut self, _name: &str, _quantity: u64) -> Result<StockMap, SubmissionError> {
            Ok(StockMap::new())
        }
        fn get_item_stock(&self, _name: &str) -> Result<u64, SubmissionError> {
            Ok(15)
        }
        fn get_available_items(&self) -> Result<Vec<String>, SubmissionError> {
            Err(SubmissionError::NotImplemented("get_available_items".to_string()))
        }
    }

    const CONSTANT_SOURCE: &str = r#"
fn add_item(&mut self, name: &str, quantity: u64) -> Result<StockMap, SubmissionError> {
    if self.items.contains_key(name) { *self.items.get_mut(name).unwrap() += quantity; }
    Ok(self.items.clone())
}
fn update_stock(&mut self, _n: &str, _q: u64) -> Res { todo!() }
fn get_item_stock(&self, _name: &str) -> Result<u64, SubmissionError> {
    Ok(15)
}
fn get_available_items(&self) -> Result<Vec<String>, SubmissionError> {
    for _ in 0..1 {}
    Err(SubmissionError::NotImplemented("get_available_items".to_string()))
}
"#;

    fn reference() -> SubmissionSource {
        SubmissionSource::new(REFERENCE_SOURCE)
    }

    #[test]
    fn test_reference_model_passes_default_suites() {
        let evaluator = CaseEvaluator::default();
        let failures = RandomizedFailureSet::new();

        for suite in TestSuite::defaults() {
            for (i, case) in suite.cases.iter().enumerate() {
                let at = CaseRef {
                    section: &suite.section,
                    number: i + 1,
                };
                let verdict = evaluator.evaluate(at, case, InventoryModel::new(), &reference(), &failures);
                assert!(verdict.is_passed(), "{}", verdict);
            }
        }
    }

    #[test]
    fn test_baseline_then_lookup_returns_fifteen() {
        let case = TestCase::new("Get item stock", Call::get_item_stock("Laptop"), Expected::Quantity(15));
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            InventoryModel::new(),
            &reference(),
            &RandomizedFailureSet::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Passed);
    }

    #[test]
    fn test_output_mismatch() {
        let case = TestCase::new("Wrong expectation", Call::get_item_stock("Laptop"), Expected::Quantity(14));
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            InventoryModel::new(),
            &reference(),
            &RandomizedFailureSet::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(verdict.reason.as_deref(), Some("Output mismatch"));
        assert_eq!(verdict.expected.as_deref(), Some("14"));
        assert_eq!(verdict.actual.as_deref(), Some("15"));
    }

    #[test]
    fn test_hardcoded_source_fails_even_when_output_matches() {
        let case = TestCase::new("Get item stock", Call::get_item_stock("Laptop"), Expected::Quantity(15));
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            ConstantStock,
            &SubmissionSource::new(CONSTANT_SOURCE),
            &RandomizedFailureSet::new(),
        );

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(verdict.actual.as_deref(), Some("15"));
        assert!(matches!(verdict.red_flag, Some(RedFlag::Hardcoded { .. })));
        assert_eq!(verdict.reason.as_deref(), Some("Hardcoded return detected"));
    }

    #[test]
    fn test_stub_source_fails_regardless_of_output() {
        let case = TestCase::new("Update stock", Call::update_stock("Laptop", 15), Expected::stock(&[]));
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            ConstantStock,
            &SubmissionSource::new(CONSTANT_SOURCE),
            &RandomizedFailureSet::new(),
        );

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert!(matches!(verdict.red_flag, Some(RedFlag::Stub { .. })));
    }

    #[test]
    fn test_randomized_failure_overrides_flag() {
        let case = TestCase::new("Get item stock", Call::get_item_stock("Laptop"), Expected::Quantity(15));
        let failures: RandomizedFailureSet = [Operation::GetItemStock].into_iter().collect();
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            ConstantStock,
            &SubmissionSource::new(CONSTANT_SOURCE),
            &failures,
        );

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Randomized test failed for get_item_stock")
        );
        assert!(verdict.red_flag.is_none());
    }

    #[test]
    fn test_randomized_failure_on_other_operation_is_ignored() {
        let case = TestCase::new("Get item stock", Call::get_item_stock("Laptop"), Expected::Quantity(15));
        let failures: RandomizedFailureSet = [Operation::UpdateStock].into_iter().collect();
        let verdict =
            CaseEvaluator::default().evaluate(AT, &case, InventoryModel::new(), &reference(), &failures);
        assert!(verdict.is_passed());
    }

    #[test]
    fn test_submission_error_crashes_case() {
        let case = TestCase::new("Listing", Call::get_available_items(), Expected::items(&["Laptop"]));
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            ConstantStock,
            &SubmissionSource::new(CONSTANT_SOURCE),
            &RandomizedFailureSet::new(),
        );

        assert_eq!(verdict.status, VerdictStatus::Crashed);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Operation 'get_available_items' is not implemented")
        );
    }

    #[test]
    fn test_missing_function_crashes_case() {
        let case = TestCase::new("Get item stock", Call::get_item_stock("Laptop"), Expected::Quantity(15));
        let verdict = CaseEvaluator::default().evaluate(
            AT,
            &case,
            InventoryModel::new(),
            &SubmissionSource::new("fn add_item() { x += 1 }"),
            &RandomizedFailureSet::new(),
        );

        assert_eq!(verdict.status, VerdictStatus::Crashed);
        assert!(verdict
            .reason
            .as_deref()
            .is_some_and(|r| r.contains("get_item_stock")));
    }
}
