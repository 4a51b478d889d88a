//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoInvoiceStore` and `MongoSequenceCounter` backed by a
//! MongoDB database via `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! invox = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Records live in an `invoices` collection, one document per spreadsheet
//! row. Sequences live in a `counters` collection keyed by sequence name;
//! `next` is a single `findOneAndUpdate` with `$inc`, upsert, and
//! return-after, so the increment-and-read is one atomic step on the server.
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. This keeps UUIDs as strings and
//! `createdAt` as an ISO 8601 string (which sorts correctly as text). The
//! `id` field is mapped to MongoDB's `_id` convention.

use crate::core::invoice::InvoiceRecord;
use crate::core::service::{InvoiceStore, SequenceCounter};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Database};
use serde_json::{Map, Value};
use uuid::Uuid;

const INVOICES_COLLECTION: &str = "invoices";
const COUNTERS_COLLECTION: &str = "counters";

/// Connect to MongoDB and select the named database.
///
/// The driver connects lazily; this does not verify reachability. Use
/// [`ping`] at startup to surface connection problems early.
pub async fn connect(uri: &str, db_name: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(|e| anyhow!("Failed to parse MongoDB connection string: {}", e))?;
    Ok(client.database(db_name))
}

/// Round-trip a ping command to verify the database is reachable.
pub async fn ping(database: &Database) -> Result<()> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| anyhow!("MongoDB ping failed: {}", e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON
/// Document, renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` for the record convention.
fn document_to_json(mut doc: Document) -> Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn record_to_document(record: &InvoiceRecord) -> Result<Document> {
    let json = serde_json::to_value(record)
        .map_err(|e| anyhow!("Failed to serialize invoice record: {}", e))?;
    json_to_document(json)
}

fn document_to_record(doc: Document) -> Result<InvoiceRecord> {
    let json = document_to_json(doc);
    serde_json::from_value(json)
        .map_err(|e| anyhow!("Failed to deserialize invoice record from document: {}", e))
}

/// Convert a record id to its BSON string representation for queries.
fn id_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

// ---------------------------------------------------------------------------
// MongoInvoiceStore
// ---------------------------------------------------------------------------

/// Invoice store backed by the `invoices` collection.
#[derive(Clone, Debug)]
pub struct MongoInvoiceStore {
    database: Database,
}

impl MongoInvoiceStore {
    /// Create a new store with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(INVOICES_COLLECTION)
    }
}

#[async_trait]
impl InvoiceStore for MongoInvoiceStore {
    /// Insert the document and read it back to return the stored version.
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord> {
        let doc = record_to_document(&record)?;
        let id = id_bson(&record.id);

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to insert invoice: {}", e))?;

        let stored = self
            .collection()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| anyhow!("Failed to read back inserted invoice: {}", e))?
            .ok_or_else(|| anyhow!("Invoice not found after insert"))?;

        document_to_record(stored)
    }

    /// List all invoices, newest first.
    async fn find_all(&self) -> Result<Vec<InvoiceRecord>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| anyhow!("Failed to list invoices: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect invoices: {}", e))?;

        docs.into_iter().map(document_to_record).collect()
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<InvoiceRecord>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": id_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get invoice: {}", e))?;

        match doc {
            Some(d) => Ok(Some(document_to_record(d)?)),
            None => Ok(None),
        }
    }

    /// Whole-payload replace of the `data` field; `createdAt` is untouched.
    async fn update_by_id(
        &self,
        id: &Uuid,
        data: Map<String, Value>,
    ) -> Result<Option<InvoiceRecord>> {
        let data_bson = mongodb::bson::to_bson(&Value::Object(data))
            .map_err(|e| anyhow!("Failed to convert payload to BSON: {}", e))?;

        let updated = self
            .collection()
            .find_one_and_update(doc! { "_id": id_bson(id) }, doc! { "$set": { "data": data_bson } })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update invoice: {}", e))?;

        match updated {
            Some(d) => Ok(Some(document_to_record(d)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": id_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete invoice: {}", e))?;

        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = self
            .collection()
            .delete_many(doc! {})
            .await
            .map_err(|e| anyhow!("Failed to clear invoices: {}", e))?;

        Ok(result.deleted_count)
    }
}

// ---------------------------------------------------------------------------
// MongoSequenceCounter
// ---------------------------------------------------------------------------

/// Sequence counter backed by the `counters` collection.
///
/// Each sequence is one document `{_id: name, seq: N}`. The upsert creates
/// the document on first use, so a fresh sequence yields 1.
#[derive(Clone, Debug)]
pub struct MongoSequenceCounter {
    database: Database,
}

impl MongoSequenceCounter {
    /// Create a new counter with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(COUNTERS_COLLECTION)
    }
}

#[async_trait]
impl SequenceCounter for MongoSequenceCounter {
    async fn next(&self, name: &str) -> Result<i64> {
        let doc = self
            .collection()
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to increment sequence '{}': {}", name, e))?
            .ok_or_else(|| anyhow!("Sequence '{}' missing after upsert", name))?;

        doc.get_i64("seq")
            .map_err(|e| anyhow!("Sequence '{}' has a non-integer value: {}", name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // json_to_document
    // -----------------------------------------------------------------------

    #[test]
    fn json_to_document_renames_id_to_underscore_id() {
        let input = json!({"id": "abc", "data": {"In_no": "A100"}});
        let doc = json_to_document(input).unwrap();

        assert!(doc.contains_key("_id"), "document should contain _id");
        assert!(!doc.contains_key("id"), "document should not contain id");
        assert_eq!(doc.get_str("_id").unwrap(), "abc");
    }

    #[test]
    fn json_to_document_non_object_returns_error() {
        let result = json_to_document(json!("string"));

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(
            err_msg.contains("non-object"),
            "error should mention non-object, got: {err_msg}"
        );
    }

    // -----------------------------------------------------------------------
    // document_to_json
    // -----------------------------------------------------------------------

    #[test]
    fn document_to_json_renames_underscore_id_to_id() {
        let doc = doc! { "_id": "abc", "createdAt": "2024-01-01T00:00:00Z" };
        let json = document_to_json(doc);

        assert_eq!(json["id"], "abc");
        assert!(json.get("_id").is_none(), "json should not contain _id");
    }

    // -----------------------------------------------------------------------
    // record roundtrip
    // -----------------------------------------------------------------------

    #[test]
    fn record_document_roundtrip() {
        let mut data = Map::new();
        data.insert("In_no".to_string(), json!("A100"));
        data.insert("amount".to_string(), json!(120.5));

        let record = InvoiceRecord {
            id: Uuid::new_v4(),
            data,
            created_at: Utc::now(),
            source_file: Some("uploads/book.xlsx".to_string()),
        };

        let doc = record_to_document(&record).unwrap();
        assert!(doc.contains_key("_id"));
        assert!(!doc.contains_key("id"));

        let back = document_to_record(doc).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.data, record.data);
        assert_eq!(back.source_file, record.source_file);
    }

    #[test]
    fn id_bson_returns_string() {
        let id = Uuid::new_v4();
        match id_bson(&id) {
            Bson::String(s) => assert_eq!(s, id.to_string()),
            other => panic!("expected Bson::String, got: {other:?}"),
        }
    }
}
