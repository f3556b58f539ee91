//! Flow aggregation between categorical columns
//!
//! Builds the node/link data behind a flow (Sankey) diagram: each
//! consecutive pair of columns becomes one stage, and every distinct
//! (source value, target value) pair becomes a link weighted by how many
//! rows carry it. Rendering is left to the caller.

use crate::error::ComputeError;
use crate::types::{InteractionRow, COLUMN_NAMES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A weighted link between two labels (indices into [`FlowGraph::labels`])
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub count: usize,
}

/// Labelled flow graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Distinct cell values, sorted
    pub labels: Vec<String>,
    /// Human-readable form of each label, same order as `labels`
    pub display_labels: Vec<String>,
    pub links: Vec<FlowLink>,
}

/// Aggregate row flows across `columns`.
///
/// Absent cells are skipped. Pairs seen fewer than `threshold` times are dropped.
pub fn aggregate_flows<S: AsRef<str>>(
    rows: &[InteractionRow],
    columns: &[S],
    threshold: usize,
) -> Result<FlowGraph, ComputeError> {
    if columns.len() < 2 {
        return Err(ComputeError::FlowError(format!(
            "need at least two columns, got {}",
            columns.len()
        )));
    }
    for column in columns {
        if !COLUMN_NAMES.contains(&column.as_ref()) {
            return Err(ComputeError::UnknownColumn(column.as_ref().to_string()));
        }
    }

    let mut stacked: Vec<(String, String, usize)> = Vec::new();

    for pair in columns.windows(2) {
        let (src, targ) = (pair[0].as_ref(), pair[1].as_ref());

        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for row in rows {
            let source = row.value(src).and_then(cell_label);
            let target = row.value(targ).and_then(cell_label);
            if let (Some(source), Some(target)) = (source, target) {
                *counts.entry((source, target)).or_insert(0) += 1;
            }
        }

        stacked.extend(
            counts
                .into_iter()
                .filter(|(_, count)| *count >= threshold)
                .map(|((source, target), count)| (source, target, count)),
        );
    }

    let labels: Vec<String> = stacked
        .iter()
        .flat_map(|(source, target, _)| [source.clone(), target.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Every link endpoint is one of the labels
    let index_of: BTreeMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();

    let links = stacked
        .iter()
        .map(|(source, target, count)| FlowLink {
            source: index_of[source.as_str()],
            target: index_of[target.as_str()],
            count: *count,
        })
        .collect();

    let display_labels = labels.iter().map(|l| display_label(l).to_string()).collect();

    tracing::debug!(
        stages = columns.len() - 1,
        labels = labels.len(),
        "aggregated flows"
    );

    Ok(FlowGraph {
        labels,
        display_labels,
        links,
    })
}

/// Human-readable name for a classification value
pub fn display_label(label: &str) -> &str {
    match label {
        "match" => "Match",
        "no_match" => "No Match",
        "received" => "Like Received",
        "sent" => "Like Sent",
        other => other,
    }
}

fn cell_label(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
