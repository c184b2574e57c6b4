//! Test case definitions and the built-in visible and hidden suites.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, SubmissionError};
use crate::inventory::{Inventory, Operation, StockMap};

/// One invocation of an inventory operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    AddItem { name: String, quantity: u64 },
    UpdateStock { name: String, quantity: u64 },
    GetItemStock { name: String },
    GetAvailableItems,
}

impl Call {
    pub fn add_item(name: &str, quantity: u64) -> Self {
        Call::AddItem {
            name: name.to_string(),
            quantity,
        }
    }

    pub fn update_stock(name: &str, quantity: u64) -> Self {
        Call::UpdateStock {
            name: name.to_string(),
            quantity,
        }
    }

    pub fn get_item_stock(name: &str) -> Self {
        Call::GetItemStock {
            name: name.to_string(),
        }
    }

    pub fn get_available_items() -> Self {
        Call::GetAvailableItems
    }

    /// The operation this call targets.
    pub fn operation(&self) -> Operation {
        match self {
            Call::AddItem { .. } => Operation::AddItem,
            Call::UpdateStock { .. } => Operation::UpdateStock,
            Call::GetItemStock { .. } => Operation::GetItemStock,
            Call::GetAvailableItems => Operation::GetAvailableItems,
        }
    }

    /// Invoke the call on `inventory` and capture what it returned.
    pub fn apply<I: Inventory + ?Sized>(&self, inventory: &mut I) -> Result<Observed, SubmissionError> {
        match self {
            Call::AddItem { name, quantity } => inventory.add_item(name, *quantity).map(Observed::Stock),
            Call::UpdateStock { name, quantity } => {
                inventory.update_stock(name, *quantity).map(Observed::Stock)
            }
            Call::GetItemStock { name } => inventory.get_item_stock(name).map(Observed::Quantity),
            Call::GetAvailableItems => inventory.get_available_items().map(Observed::Items),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::AddItem { name, quantity } | Call::UpdateStock { name, quantity } => {
                write!(f, "{}({:?}, {})", self.operation(), name, quantity)
            }
            Call::GetItemStock { name } => write!(f, "{}({:?})", self.operation(), name),
            Call::GetAvailableItems => write!(f, "{}()", self.operation()),
        }
    }
}

/// State a fresh inventory is brought to before a case runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fixture {
    /// Nothing; the case starts from an empty inventory.
    Empty,
    /// Laptop=10 and Mouse=0 added, then Laptop updated to 15.
    #[default]
    Baseline,
}

impl Fixture {
    /// Calls that establish this fixture, in order.
    pub fn calls(&self) -> Vec<Call> {
        match self {
            Fixture::Empty => Vec::new(),
            Fixture::Baseline => vec![
                Call::add_item("Laptop", 10),
                Call::add_item("Mouse", 0),
                Call::update_stock("Laptop", 15),
            ],
        }
    }
}

/// Value returned by a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observed {
    Stock(StockMap),
    Quantity(u64),
    Items(Vec<String>),
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = match self {
            Observed::Stock(map) => serde_json::to_string(map),
            Observed::Quantity(q) => serde_json::to_string(q),
            Observed::Items(items) => serde_json::to_string(items),
        }
        .map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Value a case expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// Exact mapping equality.
    Stock(StockMap),
    /// Exact scalar equality.
    Quantity(u64),
    /// Set equality over item names; order is ignored.
    Items(Vec<String>),
}

impl Expected {
    pub fn stock(entries: &[(&str, u64)]) -> Self {
        Expected::Stock(entries.iter().map(|(n, q)| (n.to_string(), *q)).collect())
    }

    pub fn items(names: &[&str]) -> Self {
        Expected::Items(names.iter().map(|n| n.to_string()).collect())
    }

    /// Whether `observed` satisfies this expectation.
    pub fn matches(&self, observed: &Observed) -> bool {
        match (self, observed) {
            (Expected::Stock(want), Observed::Stock(got)) => want == got,
            (Expected::Quantity(want), Observed::Quantity(got)) => want == got,
            (Expected::Items(want), Observed::Items(got)) => {
                want.iter().collect::<BTreeSet<_>>() == got.iter().collect::<BTreeSet<_>>()
            }
            _ => false,
        }
    }

    /// Literal form searched for in submission source by the hardcode heuristic.
    pub fn literal(&self) -> String {
        let rendered = match self {
            Expected::Stock(map) => serde_json::to_string(map),
            Expected::Quantity(q) => serde_json::to_string(q),
            Expected::Items(items) => serde_json::to_string(items),
        };
        rendered.unwrap_or_default()
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal())
    }
}

/// A single graded case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Human-readable description shown in the report
    pub description: String,
    /// Starting state applied before `setup`
    #[serde(default)]
    pub fixture: Fixture,
    /// Calls applied after the fixture, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<Call>,
    /// The graded call
    pub call: Call,
    /// What the graded call must return
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub expected: Expected,
}

impl TestCase {
    /// Creates a case starting from the baseline fixture.
    pub fn new(description: impl Into<String>, call: Call, expected: Expected) -> Self {
        Self {
            description: description.into(),
            fixture: Fixture::Baseline,
            setup: Vec::new(),
            call,
            expected,
        }
    }

    /// Sets the fixture.
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = fixture;
        self
    }

    /// Appends a setup call.
    pub fn with_setup(mut self, call: Call) -> Self {
        self.setup.push(call);
        self
    }

    /// Operation under test.
    pub fn operation(&self) -> Operation {
        self.call.operation()
    }

    /// Checks that the expected value has the shape the call returns.
    pub fn validate(&self) -> Result<(), GradeError> {
        let shape_ok = matches!(
            (&self.call, &self.expected),
            (Call::AddItem { .. } | Call::UpdateStock { .. }, Expected::Stock(_))
                | (Call::GetItemStock { .. }, Expected::Quantity(_))
                | (Call::GetAvailableItems, Expected::Items(_))
        );
        if !shape_ok {
            return Err(GradeError::InvalidSuite(format!(
                "case '{}': expected value {} does not fit {}",
                self.description, self.expected, self.call
            )));
        }
        Ok(())
    }
}

/// A named group of cases, e.g. "Visible" or "Hidden".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub section: String,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(section: impl Into<String>, cases: Vec<TestCase>) -> Self {
        Self {
            section: section.into(),
            cases,
        }
    }

    /// Cases shown to learners.
    pub fn visible() -> Self {
        Self::new(
            "Visible",
            vec![
                TestCase::new(
                    "Add item",
                    Call::add_item("Laptop", 10),
                    Expected::stock(&[("Laptop", 10)]),
                )
                .with_fixture(Fixture::Empty),
                TestCase::new(
                    "Update stock",
                    Call::update_stock("Laptop", 15),
                    Expected::stock(&[("Laptop", 15), ("Mouse", 0)]),
                ),
                TestCase::new(
                    "Get item stock",
                    Call::get_item_stock("Laptop"),
                    Expected::Quantity(15),
                ),
            ],
        )
    }

    /// Cases withheld from learners.
    pub fn hidden() -> Self {
        Self::new(
            "Hidden",
            vec![
                TestCase::new(
                    "Get available items (some zero)",
                    Call::get_available_items(),
                    Expected::items(&["Laptop"]),
                ),
                TestCase::new(
                    "Add item multiple times and verify cumulative quantity",
                    Call::add_item("Tablet", 5),
                    Expected::stock(&[("Laptop", 15), ("Mouse", 0), ("Tablet", 8)]),
                )
                .with_setup(Call::add_item("Tablet", 3)),
            ],
        )
    }

    /// Visible then hidden.
    pub fn defaults() -> Vec<TestSuite> {
        vec![Self::visible(), Self::hidden()]
    }

    /// Loads a list of suites from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Vec<TestSuite>, GradeError> {
        let content = fs::read_to_string(path)?;
        let suites: Vec<TestSuite> = serde_yaml::from_str(&content)?;
        for suite in &suites {
            suite.validate()?;
        }
        Ok(suites)
    }

    /// Validates every case in the suite.
    pub fn validate(&self) -> Result<(), GradeError> {
        if self.cases.is_empty() {
            return Err(GradeError::InvalidSuite(format!(
                "section '{}' has no cases",
                self.section
            )));
        }
        self.cases.iter().try_for_each(TestCase::validate)
    }
}

/// Applies a fixture to a fresh inventory.
pub fn apply_fixture<I: Inventory + ?Sized>(fixture: Fixture, inventory: &mut I) -> Result<(), SubmissionError> {
    for call in fixture.calls() {
        call.apply(inventory)?;
    }
    Ok(())
}

/// Expected stock after the baseline fixture.
pub fn baseline_stock() -> StockMap {
    BTreeMap::from([("Laptop".to_string(), 15), ("Mouse".to_string(), 0)])
}
