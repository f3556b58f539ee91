//! Adapter for reading matches exports
//!
//! Exports arrive as a JSON array of interaction records. NDJSON (one record
//! per line) is accepted as well for piping large exports.

use crate::error::ComputeError;
use crate::schema::interaction::RawInteraction;
use crate::transformer::InteractionTransformer;

/// Adapter for turning export text into raw interaction records
pub struct ExportAdapter;

impl ExportAdapter {
    /// Parse a JSON string containing an array of interactions
    pub fn parse_array(json: &str) -> Result<Vec<RawInteraction>, ComputeError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value).map_err(|e| ComputeError::InvalidInteraction {
                    index,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Parse NDJSON (newline-delimited JSON) containing interactions
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawInteraction>, ComputeError> {
        let mut interactions = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawInteraction>(trimmed) {
                Ok(interaction) => interactions.push(interaction),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(interactions)
    }

    /// Validate a batch of interactions.
    ///
    /// Only failing interactions are reported.
    pub fn validate_interactions(interactions: &[RawInteraction]) -> Vec<ValidationResult> {
        interactions
            .iter()
            .enumerate()
            .filter_map(|(index, interaction)| {
                InteractionTransformer::transform_one(index, interaction)
                    .err()
                    .map(|error| ValidationResult { index, error })
            })
            .collect()
    }
}

/// A failed interaction and why it failed
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub error: ComputeError,
}
