//! Care-Team Experience
//!
//! Collaboration graphs and team-experience metrics from clinical note corpora:
//! - Note normalization (column bindings, same-day dedup, in-team labelling)
//! - Same-visit co-authorship edges (experience vs. care-team)
//! - Per-visit weighted experience graphs over a lookback window
//! - Clustering, cumulative-experience and gender-composition metrics

pub mod corpus;
pub mod edges;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod notes;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use corpus::TeamworkCorpus;
pub use error::{CorpusError, Result};

use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::path::Path;

use notes::ColumnMapping;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub columns: ColumnMapping,
    pub windows: WindowsYamlConfig,
    pub departments: DepartmentsYamlConfig,
}

/// Window configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowsYamlConfig {
    /// Lookback for prior collaboration, in days
    pub teamwork_days: i64,
    /// Maximum delay after admission for a note to count toward the team, in days
    pub team_days: i64,
    /// Anchor of the warm-up period (`YYYY-MM-DD`); earliest admission when absent
    pub study_start: Option<NaiveDate>,
}

impl Default for WindowsYamlConfig {
    fn default() -> Self {
        Self {
            teamwork_days: 90,
            team_days: 2,
            study_start: None,
        }
    }
}

/// Department file section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DepartmentsYamlConfig {
    pub id_column: String,
}

impl Default for DepartmentsYamlConfig {
    fn default() -> Self {
        Self {
            id_column: "enc_csn_id".into(),
        }
    }
}

// ============================================================================
// Runtime config (what the pipeline actually uses)
// ============================================================================

/// Corpus configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusConfig {
    pub columns: ColumnMapping,
    pub teamwork_window_days: i64,
    pub team_window_days: i64,
    pub study_start: Option<NaiveDate>,
    /// Id column of the department file
    pub department_id_column: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self::from_yaml(YamlConfig::default())
    }
}

impl CorpusConfig {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "teamwork.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        let mut config = Self::from_yaml(yaml);

        if let Some(days) = env_parse("TEAMWORK_WINDOW_DAYS") {
            config.teamwork_window_days = days;
        }
        if let Some(days) = env_parse("TEAM_WINDOW_DAYS") {
            config.team_window_days = days;
        }
        if let Some(start) = env_parse("TEAMWORK_STUDY_START") {
            config.study_start = Some(start);
        }

        config.validate()?;
        Ok(config)
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        Self {
            columns: yaml.columns,
            teamwork_window_days: yaml.windows.teamwork_days,
            team_window_days: yaml.windows.team_days,
            study_start: yaml.windows.study_start,
            department_id_column: yaml.departments.id_column,
        }
    }

    /// Reject negative or out-of-range windows and unusable column bindings.
    pub fn validate(&self) -> Result<()> {
        window_duration("teamwork", self.teamwork_window_days)?;
        window_duration("team", self.team_window_days)?;
        if self.department_id_column.trim().is_empty() {
            return Err(CorpusError::InvalidConfig(
                "department id column must not be empty".into(),
            ));
        }
        self.columns.validate()
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("teamwork.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// `days` as a [`Duration`]. Negative or unrepresentable spans are config errors.
pub(crate) fn window_duration(name: &str, days: i64) -> Result<Duration> {
    if days < 0 {
        return Err(CorpusError::InvalidConfig(format!(
            "{} window must not be negative (got {} days)",
            name, days
        )));
    }
    Duration::try_days(days).ok_or_else(|| {
        CorpusError::InvalidConfig(format!("{} window of {} days is out of range", name, days))
    })
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

// ============================================================================
// Tests
// ============================================================================
