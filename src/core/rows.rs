//! Uploaded row handling: batch normalization and external number lookup
//!
//! Spreadsheet exports are messy about header names: the invoice number
//! column arrives as `In_no`, sometimes with trailing whitespace baked into
//! the header cell. Lookup accepts the exact name first, then any key that
//! equals it after trimming trailing whitespace.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

/// The spreadsheet column that carries the external invoice number.
pub const NUMBER_COLUMN: &str = "In_no";

/// Normalized payload key under which the external number is stored.
pub const NORMALIZED_NUMBER_KEY: &str = "invoiceNo";

/// Parse the JSON-encoded `invoiceData` field into a batch of rows.
///
/// A single row object is normalized to a one-element batch. Anything that
/// is not an object or an array of objects fails the whole request; this
/// happens before the per-row loop, so no rows are partially processed.
pub fn parse_batch(raw: &str) -> Result<Vec<Map<String, Value>>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("invoiceData is not valid JSON: {}", e))?;

    let items = match value {
        Value::Object(row) => vec![row],
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(row) => rows.push(row),
                    other => bail!("invoiceData rows must be objects, got: {}", other),
                }
            }
            rows
        }
        other => bail!("invoiceData must be an object or an array, got: {}", other),
    };

    Ok(items)
}

/// Resolve the external invoice number from a row payload.
///
/// Checks the exact column name first, then keys that match after trimming
/// trailing whitespace; first match wins. Numeric cell values are accepted
/// and rendered as strings. Empty or whitespace-only values count as absent.
pub fn external_number(data: &Map<String, Value>) -> Option<String> {
    if let Some(number) = coerce_number(data.get(NUMBER_COLUMN)) {
        return Some(number);
    }

    data.iter()
        .filter(|(key, _)| key.as_str() != NUMBER_COLUMN && key.trim_end() == NUMBER_COLUMN)
        .find_map(|(_, value)| coerce_number(Some(value)))
}

fn coerce_number(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
