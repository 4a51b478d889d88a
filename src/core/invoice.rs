//! Invoice record model
//!
//! An invoice record is one persisted spreadsheet row. The row payload is an
//! open key-value map: the row shape is spreadsheet-defined and varies by
//! upload, so no static schema is imposed on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One invoice document, as stored and as returned by the API.
///
/// - `id` is store-assigned and opaque; clients use it only to address a
///   single record. The MongoDB backend maps it to `_id`.
/// - `data` holds the original row fields, unvalidated, plus the external
///   invoice number under the normalized `invoiceNo` key.
/// - `created_at` is set at insertion and never changes afterwards.
/// - `source_file` points at the stored upload that produced the record,
///   when one was attached to the batch.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: Uuid,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl InvoiceRecord {
    /// Create a new record with a fresh id and the current timestamp.
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            created_at: Utc::now(),
            source_file: None,
        }
    }

    /// Attach the stored path of the upload that produced this record.
    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_data() -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("In_no".to_string(), json!("A100"));
        data.insert("customer".to_string(), json!("Acme"));
        data
    }

    #[test]
    fn new_assigns_unique_ids() {
        let a = InvoiceRecord::new(sample_data());
        let b = InvoiceRecord::new(sample_data());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = InvoiceRecord::new(sample_data()).with_source_file("uploads/book.xlsx");
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("createdAt").is_some());
        assert_eq!(value["sourceFile"], "uploads/book.xlsx");
        assert_eq!(value["data"]["In_no"], "A100");
    }

    #[test]
    fn source_file_omitted_when_absent() {
        let record = InvoiceRecord::new(sample_data());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("sourceFile").is_none());
    }

    #[test]
    fn json_roundtrip_preserves_payload() {
        let record = InvoiceRecord::new(sample_data());
        let json = serde_json::to_string(&record).unwrap();
        let back: InvoiceRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, record.id);
        assert_eq!(back.data, record.data);
        assert_eq!(back.created_at, record.created_at);
    }
}
