//! Input parsing helpers
//!
//! Snapshots and sample batches arrive either as one JSON document or as
//! newline-delimited JSON. Both shapes parse through here so the CLI and FFI
//! report line numbers the same way.

use crate::error::ComputeError;
use serde::de::DeserializeOwned;

/// Parse a JSON array of records
pub fn parse_array<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, ComputeError> {
    let records: Vec<T> = serde_json::from_str(json)?;
    Ok(records)
}

/// Parse NDJSON (one record per line, blank lines ignored)
pub fn parse_ndjson<T: DeserializeOwned>(ndjson: &str) -> Result<Vec<T>, ComputeError> {
    let mut records = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                return Err(ComputeError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(records)
}

/// Parse either a single JSON object or an array of them
pub fn parse_one_or_many<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, ComputeError> {
    if json.trim_start().starts_with('[') {
        parse_array(json)
    } else {
        Ok(vec![serde_json::from_str(json)?])
    }
}
