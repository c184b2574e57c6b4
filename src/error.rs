//! Error types for stockgrade operations.
//!
//! Two families of errors exist:
//! - Errors a graded submission reports from its own operations
//! - Errors raised by the harness itself (configuration, I/O, source scanning)

use thiserror::Error;

/// Errors a submission can return from an inventory operation.
///
/// The harness treats every variant as a crash of the case being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Item '{0}' not found")]
    ItemNotFound(String),

    #[error("Invalid quantity {quantity} for item '{item}'")]
    InvalidQuantity { item: String, quantity: u64 },

    #[error("Operation '{0}' is not implemented")]
    NotImplemented(String),

    #[error("Submission panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

/// Errors that can occur while grading.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("Function '{0}' not found in submission source")]
    FunctionNotFound(String),

    #[error("Unterminated body for function '{0}' in submission source")]
    UnterminatedFunction(String),

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid test suite: {0}")]
    InvalidSuite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
