//! Red-flag heuristics over the source text of a single operation.
//!
//! Three flags are checked in precedence order and only the first match is
//! reported: stub, hardcoded return, missing required logic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::inventory::Operation;

/// Default stub threshold on trimmed source length.
const DEFAULT_STUB_MAX_LEN: usize = 80;

/// Default hardcode threshold on source length.
const DEFAULT_HARDCODE_MAX_LEN: usize = 150;

/// A heuristic signal that a submission games the cases instead of implementing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedFlag {
    /// Body is little more than a no-op marker.
    Stub { marker: String },
    /// Expected value appears literally in a short body.
    Hardcoded { literal: String },
    /// None of the operation's required constructs appear.
    MissingLogic { keywords: Vec<String> },
}

impl fmt::Display for RedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedFlag::Stub { marker } => write!(f, "Function contains only '{}'", marker),
            RedFlag::Hardcoded { .. } => write!(f, "Hardcoded return detected"),
            RedFlag::MissingLogic { keywords } => {
                write!(f, "Missing logic: expected keywords [{}]", keywords.join(", "))
            }
        }
    }
}

/// Thresholds and token lists used by [`RedFlagScanner`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Tokens marking an unimplemented body
    pub stub_markers: Vec<String>,
    /// A body shorter than this (after trimming) that holds a stub marker is a stub
    pub stub_max_len: usize,
    /// A body shorter than this that embeds the expected value is hardcoded
    pub hardcode_max_len: usize,
    /// Per-operation constructs; at least one must appear in the body
    pub required_keywords: BTreeMap<Operation, Vec<String>>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        let keywords = |list: &[&str]| list.iter().map(|k| k.to_string()).collect::<Vec<_>>();

        let mut required_keywords = BTreeMap::new();
        required_keywords.insert(
            Operation::AddItem,
            keywords(&["+=", "return", " in ", "entry(", "contains_key"]),
        );
        required_keywords.insert(
            Operation::UpdateStock,
            keywords(&["return", "if", "not", "get_mut"]),
        );
        required_keywords.insert(
            Operation::GetItemStock,
            keywords(&["return", "if", "not", "match", "unwrap_or"]),
        );
        required_keywords.insert(Operation::GetAvailableItems, keywords(&["for", "if", "filter"]));

        Self {
            stub_markers: keywords(&["pass", "todo!", "unimplemented!"]),
            stub_max_len: DEFAULT_STUB_MAX_LEN,
            hardcode_max_len: DEFAULT_HARDCODE_MAX_LEN,
            required_keywords,
        }
    }
}

impl HeuristicConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stub marker token.
    pub fn with_stub_marker(mut self, marker: &str) -> Self {
        self.stub_markers.push(marker.to_lowercase());
        self
    }

    /// Set the stub length threshold.
    pub fn with_stub_max_len(mut self, len: usize) -> Self {
        self.stub_max_len = len;
        self
    }

    /// Set the hardcode length threshold.
    pub fn with_hardcode_max_len(mut self, len: usize) -> Self {
        self.hardcode_max_len = len;
        self
    }

    /// Replace the required keywords for one operation.
    pub fn with_required_keywords(mut self, op: Operation, keywords: &[&str]) -> Self {
        self.required_keywords
            .insert(op, keywords.iter().map(|k| k.to_lowercase()).collect());
        self
    }

    /// Check that the configuration can flag anything at all.
    pub fn validate(&self) -> Result<(), GradeError> {
        if self.stub_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(GradeError::InvalidConfig(
                "stub markers must be non-empty".to_string(),
            ));
        }
        for (op, keywords) in &self.required_keywords {
            if keywords.is_empty() {
                return Err(GradeError::InvalidConfig(format!(
                    "required keywords for '{}' must not be empty",
                    op
                )));
            }
        }
        Ok(())
    }
}

/// Scores function source text for red flags.
#[derive(Debug, Clone)]
pub struct RedFlagScanner {
    config: HeuristicConfig,
}

impl RedFlagScanner {
    /// Create a scanner with the given configuration.
    ///
    /// Tokens are lowercased here since matching runs on lowercased source.
    pub fn new(mut config: HeuristicConfig) -> Self {
        for marker in &mut config.stub_markers {
            *marker = marker.to_lowercase();
        }
        for keywords in config.required_keywords.values_mut() {
            for keyword in keywords.iter_mut() {
                *keyword = keyword.to_lowercase();
            }
        }
        Self { config }
    }

    /// Get the scanner configuration.
    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Scan `function_source` implementing `op`, whose case expects `expected_literal`.
    ///
    /// Returns the first flag raised, or `None` when the body looks genuine.
    pub fn scan(&self, op: Operation, function_source: &str, expected_literal: &str) -> Option<RedFlag> {
        let src = function_source.to_lowercase();

        if src.trim().len() < self.config.stub_max_len {
            if let Some(marker) = self.config.stub_markers.iter().find(|m| src.contains(m.as_str())) {
                return Some(RedFlag::Stub {
                    marker: marker.clone(),
                });
            }
        }

        let literal = self.normalize(expected_literal);
        if !literal.is_empty()
            && src.len() < self.config.hardcode_max_len
            && self.normalize(&src).contains(&literal)
        {
            return Some(RedFlag::Hardcoded { literal });
        }

        let keywords = self
            .config
            .required_keywords
            .get(&op)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if !keywords.is_empty() && !keywords.iter().any(|k| src.contains(k.as_str())) {
            return Some(RedFlag::MissingLogic {
                keywords: keywords.to_vec(),
            });
        }

        None
    }

    /// Whitespace-free, lowercase, double-quoted form used for literal matching.
    fn normalize(&self, text: &str) -> String {
        text.split_whitespace()
            .collect::<String>()
            .to_lowercase()
            .replace('\'', "\"")
    }
}

impl Default for RedFlagScanner {
    fn default() -> Self {
        Self::new(HeuristicConfig::default())
    }
}
