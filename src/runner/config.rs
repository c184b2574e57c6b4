//! Configuration for grading runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::anti_hardcoding::HeuristicConfig;
use crate::error::GradeError;

/// Default location of the appended text report.
const DEFAULT_REPORT_PATH: &str = "./student_workspace/report.txt";

/// Configuration for a grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Text report that verdict lines are appended to.
    pub report_path: PathBuf,
    /// Seed for the randomized probe; random when unset.
    pub seed: Option<u64>,
    /// Whether to print each verdict line as it is produced.
    pub echo: bool,
    /// Red-flag heuristics.
    pub heuristics: HeuristicConfig,
}

impl HarnessConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self {
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            seed: None,
            echo: true,
            heuristics: HeuristicConfig::default(),
        }
    }

    /// Loads a configuration from a YAML file; missing keys take defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the report path.
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    /// Sets the probe seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables printing verdict lines.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Sets the heuristic configuration.
    pub fn with_heuristics(mut self, heuristics: HeuristicConfig) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), GradeError> {
        if self.report_path.as_os_str().is_empty() {
            return Err(GradeError::InvalidConfig(
                "report_path must not be empty".to_string(),
            ));
        }
        self.heuristics.validate()
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_config_defaults() {
        let config = HarnessConfig::new();
        assert_eq!(config.report_path, PathBuf::from(DEFAULT_REPORT_PATH));
        assert_eq!(config.seed, None);
        assert!(config.echo);
        assert_eq!(config.heuristics.stub_max_len, 80);
        assert_eq!(config.heuristics.hardcode_max_len, 150);
    }

    #[test]
    fn test_harness_config_builder() {
        let config = HarnessConfig::new()
            .with_report_path("/tmp/report.txt")
            .with_seed(7)
            .with_echo(false)
            .with_heuristics(HeuristicConfig::new().with_stub_max_len(50));

        assert_eq!(config.report_path, PathBuf::from("/tmp/report.txt"));
        assert_eq!(config.seed, Some(7));
        assert!(!config.echo);
        assert_eq!(config.heuristics.stub_max_len, 50);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("grade.yaml");
        fs::write(
            &path,
            "report_path: out/report.txt\nseed: 42\nheuristics:\n  hardcode_max_len: 120\n",
        )
        .expect("write config");

        let config = HarnessConfig::from_yaml_file(&path).expect("load");
        assert_eq!(config.report_path, PathBuf::from("out/report.txt"));
        assert_eq!(config.seed, Some(42));
        assert!(config.echo);
        assert_eq!(config.heuristics.hardcode_max_len, 120);
        assert_eq!(config.heuristics.stub_max_len, 80);
    }

    #[test]
    fn test_empty_report_path_rejected() {
        let config = HarnessConfig::new().with_report_path("");
        assert!(matches!(config.validate(), Err(GradeError::InvalidConfig(_))));
    }
}
