//! Command-line interface for stockgrade.
//!
//! Provides commands for grading, source scanning and suite inspection.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
