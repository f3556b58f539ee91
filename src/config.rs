//! Analyzer configuration.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Export summary settings.
    pub summary: SummaryConfig,

    /// Flow aggregation settings.
    pub flows: FlowConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "warn", "debug", "hinge_lens=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

/// Export summary settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// "We met" answer that means the meeting has not happened yet.
    pub met_pending_label: String,
}

/// Flow aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Columns chained into source -> target stages.
    pub columns: Vec<String>,

    /// Minimum pair count for a link to be kept.
    pub threshold: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            met_pending_label: "Not yet".to_string(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            columns: vec!["like_type".to_string(), "match_type".to_string()],
            threshold: 0,
        }
    }
}

impl AnalyzerConfig {
    /// Parse configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        serde_json::from_str(json).map_err(|e| ComputeError::ConfigError(e.to_string()))
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ComputeError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
