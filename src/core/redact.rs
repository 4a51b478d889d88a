//! Outbound payload scrub for server-minted invoice references
//!
//! Earlier revisions of this service minted `INV###` references from a
//! counter and wrote them into row payloads. The current write path stores
//! only the spreadsheet-supplied number, but documents created by the
//! minting revision may still exist in the store, so every outbound payload
//! passes through this scrub before it reaches a client.
//!
//! The shape test is deliberately a single predicate: it is a blunt,
//! prefix-based heuristic coupled to the reference format, and keeping it in
//! one place keeps it testable against legitimate external numbers.

use crate::core::invoice::InvoiceRecord;
use crate::core::rows::NORMALIZED_NUMBER_KEY;
use serde_json::{Map, Value};

/// Prefix of server-minted invoice references.
pub const MINTED_PREFIX: &str = "INV";

/// Format a minted reference from a sequence value (`INV001`, `INV042`, …).
pub fn minted_reference(seq: i64) -> String {
    format!("{}{:03}", MINTED_PREFIX, seq)
}

/// Does this value look like a server-minted reference?
///
/// True only for the exact minted shape: the `INV` prefix followed by one or
/// more ASCII digits and nothing else. External numbers such as `A100`,
/// `inv123` or `INV-2024` do not match.
pub fn is_minted_reference(value: &str) -> bool {
    value
        .strip_prefix(MINTED_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Remove minted references from a row payload.
///
/// Drops the normalized number key when its value carries the minted shape,
/// then drops any remaining entry whose string value carries it, regardless
/// of key name. Idempotent: scrubbing an already-scrubbed payload is a
/// no-op.
pub fn scrub_payload(mut data: Map<String, Value>) -> Map<String, Value> {
    if data
        .get(NORMALIZED_NUMBER_KEY)
        .and_then(Value::as_str)
        .is_some_and(is_minted_reference)
    {
        data.remove(NORMALIZED_NUMBER_KEY);
    }

    data.retain(|_, value| !value.as_str().is_some_and(is_minted_reference));
    data
}

/// Apply the scrub to a record about to leave the dashboard.
pub fn redact(mut record: InvoiceRecord) -> InvoiceRecord {
    record.data = scrub_payload(record.data);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minted_shape_matches() {
        assert!(is_minted_reference("INV001"));
        assert!(is_minted_reference("INV7"));
        assert!(is_minted_reference("INV123456"));
    }

    #[test]
    fn legitimate_external_numbers_do_not_match() {
        // Sampled from real spreadsheet exports: plain numbers, letter
        // prefixes, dashes, lowercase.
        for value in ["A100", "4711", "inv123", "INV-2024", "2024/INV/1", "IN123"] {
            assert!(!is_minted_reference(value), "{value} must not match");
        }
    }

    #[test]
    fn bare_prefix_does_not_match() {
        assert!(!is_minted_reference("INV"));
        assert!(!is_minted_reference(""));
    }

    #[test]
    fn minted_reference_is_zero_padded() {
        assert_eq!(minted_reference(7), "INV007");
        assert_eq!(minted_reference(1234), "INV1234");
    }

    #[test]
    fn minted_reference_roundtrips_through_predicate() {
        assert!(is_minted_reference(&minted_reference(1)));
    }

    #[test]
    fn scrub_removes_minted_normalized_key() {
        let mut data = serde_json::Map::new();
        data.insert("invoiceNo".to_string(), json!("INV003"));
        data.insert("customer".to_string(), json!("Acme"));

        let clean = scrub_payload(data);
        assert!(clean.get("invoiceNo").is_none());
        assert_eq!(clean["customer"], "Acme");
    }

    #[test]
    fn scrub_keeps_external_normalized_key() {
        let mut data = serde_json::Map::new();
        data.insert("invoiceNo".to_string(), json!("A100"));

        let clean = scrub_payload(data);
        assert_eq!(clean["invoiceNo"], "A100");
    }

    #[test]
    fn scrub_removes_minted_values_under_any_key() {
        let mut data = serde_json::Map::new();
        data.insert("note".to_string(), json!("INV055"));
        data.insert("amount".to_string(), json!(120.5));

        let clean = scrub_payload(data);
        assert!(clean.get("note").is_none());
        assert_eq!(clean["amount"], 120.5);
    }

    #[test]
    fn scrub_ignores_non_string_values() {
        let mut data = serde_json::Map::new();
        data.insert("rows".to_string(), json!(["INV001"]));
        data.insert("count".to_string(), json!(3));

        // Only scalar string values are shape-tested.
        let clean = scrub_payload(data);
        assert!(clean.get("rows").is_some());
        assert!(clean.get("count").is_some());
    }

    #[test]
    fn scrub_is_idempotent() {
        let mut data = serde_json::Map::new();
        data.insert("invoiceNo".to_string(), json!("INV009"));
        data.insert("In_no".to_string(), json!("A100"));

        let once = scrub_payload(data);
        let twice = scrub_payload(once.clone());
        assert_eq!(once, twice);
    }
}
