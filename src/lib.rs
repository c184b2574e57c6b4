//! stockgrade: grading harness for inventory exercises.
//!
//! This library runs visible and hidden test cases against an inventory
//! submission, vetoes cases whose source looks stubbed, hardcoded or
//! logic-free, and appends one verdict line per case to a text report.

// Core modules
pub mod anti_hardcoding;
pub mod cli;
pub mod error;
pub mod inventory;
pub mod runner;
pub mod test_framework;

// Re-export commonly used types
pub use error::{GradeError, SubmissionError};
pub use inventory::{Inventory, InventoryModel, Operation, StockMap};
pub use runner::{Harness, HarnessConfig, SuiteReport};
