//! Service traits for invoice persistence and sequence allocation

use crate::core::invoice::InvoiceRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Persistence contract for invoice records.
///
/// Implementations provide the document-store operations the handlers need.
/// The service is agnostic to the backing store; see `storage` for the
/// in-memory and MongoDB implementations.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new record and return the stored version.
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord>;

    /// List all records, newest first.
    async fn find_all(&self) -> Result<Vec<InvoiceRecord>>;

    /// Fetch a record by id. `Ok(None)` when absent.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<InvoiceRecord>>;

    /// Replace a record's payload wholesale, keeping id and creation time.
    ///
    /// Returns the updated record, or `Ok(None)` when the id is unknown.
    async fn update_by_id(
        &self,
        id: &Uuid,
        data: Map<String, Value>,
    ) -> Result<Option<InvoiceRecord>>;

    /// Delete one record. Returns `false` when the id is unknown.
    async fn delete_by_id(&self, id: &Uuid) -> Result<bool>;

    /// Administrative reset: delete every record, returning the count removed.
    async fn delete_all(&self) -> Result<u64>;
}

/// Monotonic counter for minting human-readable invoice references.
///
/// `next` must be a single atomic increment-and-read against the backing
/// store, never a caller-side read-modify-write pair. There is no rollback:
/// if the write that consumed a value fails, the sequence keeps the gap.
#[async_trait]
pub trait SequenceCounter: Send + Sync {
    /// Atomically increment the named sequence and return the new value,
    /// creating the sequence at zero if it does not exist yet.
    async fn next(&self, name: &str) -> Result<i64>;
}
