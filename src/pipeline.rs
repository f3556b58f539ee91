//! Pipeline orchestration
//!
//! This module provides the public API for Hinge Lens.
//! It orchestrates the path from raw export JSON to rows, summaries and flows.

use crate::config::AnalyzerConfig;
use crate::error::ComputeError;
use crate::flows::{aggregate_flows, FlowGraph};
use crate::schema::ExportAdapter;
use crate::summary::ExportSummary;
use crate::table::InteractionTable;
use crate::transformer::InteractionTransformer;
use serde::{Deserialize, Serialize};

/// Convert a raw matches export (JSON array) into an interaction table.
///
/// # Arguments
/// * `raw_json` - Contents of the export's matches file
///
/// # Returns
/// One row per interaction, in export order
///
/// # Example
/// ```ignore
/// let table = transform_export(matches_json)?;
/// println!("{}", table.to_records_json()?);
/// ```
pub fn transform_export(raw_json: String) -> Result<InteractionTable, ComputeError> {
    ExportProcessor::new().transform(&raw_json)
}

/// Convert a raw matches export straight into summary statistics.
///
/// # Example
/// ```ignore
/// let summary = summarize_export(matches_json)?;
/// assert!(summary.total_likes >= summary.total_matches);
/// ```
pub fn summarize_export(raw_json: String) -> Result<ExportSummary, ComputeError> {
    let processor = ExportProcessor::new();
    let table = processor.transform(&raw_json)?;
    Ok(processor.summarize(&table))
}

/// Summary and flows computed from one export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub summary: ExportSummary,
    pub flows: FlowGraph,
}

/// Configured processor.
///
/// Holds no per-export state; the same processor can be reused freely.
#[derive(Debug, Clone, Default)]
pub struct ExportProcessor {
    config: AnalyzerConfig,
}

impl ExportProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Parse and transform a JSON array export
    pub fn transform(&self, raw_json: &str) -> Result<InteractionTable, ComputeError> {
        let interactions = ExportAdapter::parse_array(raw_json)?;
        let rows = InteractionTransformer::transform(&interactions)?;
        Ok(InteractionTable::new(rows))
    }

    /// Parse and transform an NDJSON export
    pub fn transform_ndjson(&self, raw_ndjson: &str) -> Result<InteractionTable, ComputeError> {
        let interactions = ExportAdapter::parse_ndjson(raw_ndjson)?;
        let rows = InteractionTransformer::transform(&interactions)?;
        Ok(InteractionTable::new(rows))
    }

    /// Summarize a transformed table
    pub fn summarize(&self, table: &InteractionTable) -> ExportSummary {
        ExportSummary::from_rows(table.rows(), &self.config.summary)
    }

    /// Aggregate flows across the configured columns
    pub fn flows(&self, table: &InteractionTable) -> Result<FlowGraph, ComputeError> {
        aggregate_flows(
            table.rows(),
            self.config.flows.columns.as_slice(),
            self.config.flows.threshold,
        )
    }

    /// Transform, summarize and aggregate flows in one pass
    pub fn analyze(&self, raw_json: &str) -> Result<ExportReport, ComputeError> {
        let table = self.transform(raw_json)?;
        Ok(ExportReport {
            summary: self.summarize(&table),
            flows: self.flows(&table)?,
        })
    }
}
