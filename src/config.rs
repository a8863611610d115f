//! Projection configuration
//!
//! Loaded from YAML. Every field has a default, so an empty document (or no
//! file at all) yields the stock behavior.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScheduleError;

/// Environment variable naming a YAML config file
pub const CONFIG_PATH_ENV: &str = "SCHEDULE_SPREAD_CONFIG";

/// Default per-workflow cap on projected occurrences
pub const DEFAULT_MAX_OCCURRENCES: usize = 5_000;

/// Label for workflows with no automatic recurrence
pub const DEFAULT_UNSCHEDULED_LABEL: &str = "Manual/External Trigger";

/// Tunables for occurrence projection and schedule descriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Safety ceiling on occurrences returned per workflow
    pub max_occurrences_per_workflow: usize,
    /// Append " at HH:MM" to day, week and month frequency text
    pub time_of_day_suffix: bool,
    /// Description used when a workflow has no recurrence
    pub unscheduled_label: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_occurrences_per_workflow: DEFAULT_MAX_OCCURRENCES,
            time_of_day_suffix: true,
            unscheduled_label: DEFAULT_UNSCHEDULED_LABEL.to_string(),
        }
    }
}

impl ProjectionConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScheduleError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read projection config {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse projection config {}", path.display()))?;
        info!("Loaded projection config from {}", path.display());
        Ok(config)
    }

    /// Load from the file named by `SCHEDULE_SPREAD_CONFIG`, or defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectionConfig::default();
        assert_eq!(config.max_occurrences_per_workflow, 5_000);
        assert!(config.time_of_day_suffix);
        assert_eq!(config.unscheduled_label, "Manual/External Trigger");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = ProjectionConfig::from_yaml_str("max_occurrences_per_workflow: 250\n").unwrap();
        assert_eq!(config.max_occurrences_per_workflow, 250);
        assert!(config.time_of_day_suffix);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            ProjectionConfig::from_yaml_str("  \n").unwrap(),
            ProjectionConfig::default()
        );
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = ProjectionConfig::from_yaml_str("max_occurrences_per_workflow: lots").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }

    // The only test that touches CONFIG_PATH_ENV; both branches run in sequence
    #[test]
    fn test_from_env_unset_then_file() {
        std::env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(ProjectionConfig::from_env().unwrap(), ProjectionConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projection.yaml");
        std::fs::write(&path, "max_occurrences_per_workflow: 42
time_of_day_suffix: false
")
            .unwrap();

        std::env::set_var(CONFIG_PATH_ENV, &path);
        let loaded = ProjectionConfig::from_env();
        std::env::remove_var(CONFIG_PATH_ENV);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.max_occurrences_per_workflow, 42);
        assert!(!loaded.time_of_day_suffix);
        assert_eq!(loaded.unscheduled_label, DEFAULT_UNSCHEDULED_LABEL);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = ProjectionConfig::load("/nonexistent/schedule-spread.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read projection config"));
    }
}
