//! Tabular view of transformed interactions
//!
//! Rows keep input order; columns are always [`COLUMN_NAMES`] in that order.

use crate::error::ComputeError;
use crate::types::{InteractionRow, COLUMN_NAMES};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rows x named columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionTable {
    rows: Vec<InteractionRow>,
}

impl InteractionTable {
    pub fn new(rows: Vec<InteractionRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[InteractionRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<InteractionRow> {
        self.rows
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMN_NAMES
    }

    /// Every cell of one column, top to bottom
    pub fn column(&self, name: &str) -> Result<Vec<Value>, ComputeError> {
        if !COLUMN_NAMES.contains(&name) {
            return Err(ComputeError::UnknownColumn(name.to_string()));
        }

        Ok(self
            .rows
            .iter()
            .map(|row| row.value(name).unwrap_or(Value::Null))
            .collect())
    }

    /// JSON array of row objects
    pub fn to_records_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string(&self.rows).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// JSON object mapping each column name to its cells
    pub fn to_columnar_json(&self) -> Result<String, ComputeError> {
        let mut columns = Map::new();
        for name in COLUMN_NAMES {
            columns.insert(name.to_string(), Value::Array(self.column(name)?));
        }
        serde_json::to_string(&Value::Object(columns))
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// One row object per line
    pub fn to_ndjson(&self) -> Result<String, ComputeError> {
        let mut out = String::new();
        for row in &self.rows {
            let line = serde_json::to_string(row)
                .map_err(|e| ComputeError::EncodingError(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

impl From<Vec<InteractionRow>> for InteractionTable {
    fn from(rows: Vec<InteractionRow>) -> Self {
        Self::new(rows)
    }
}
