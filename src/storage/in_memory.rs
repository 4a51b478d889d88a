//! In-memory implementations of InvoiceStore and SequenceCounter
//!
//! Useful for testing and development. Uses RwLock for thread-safe access.

use crate::core::invoice::InvoiceRecord;
use crate::core::service::{InvoiceStore, SequenceCounter};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// In-memory invoice store.
///
/// Records are kept in insertion order; `find_all` sorts by creation time,
/// newest first, with later insertions winning ties.
#[derive(Clone)]
pub struct InMemoryInvoiceStore {
    records: Arc<RwLock<Vec<InvoiceRecord>>>,
}

impl InMemoryInvoiceStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryInvoiceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.push(record.clone());

        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<InvoiceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        // Stable sort over the reversed insertion order keeps the most
        // recently inserted record first among equal timestamps.
        let mut all: Vec<InvoiceRecord> = records.iter().rev().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(all)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<InvoiceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.iter().find(|r| &r.id == id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &Uuid,
        data: Map<String, Value>,
    ) -> Result<Option<InvoiceRecord>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            return Ok(None);
        };

        record.data = data;

        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, id: &Uuid) -> Result<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = records.len();
        records.retain(|r| &r.id != id);

        Ok(records.len() < before)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let cleared = records.len() as u64;
        records.clear();

        Ok(cleared)
    }
}

/// In-memory sequence counter.
///
/// The increment happens under a single mutex acquisition, so concurrent
/// callers can never observe the same value.
#[derive(Clone)]
pub struct InMemorySequenceCounter {
    sequences: Arc<Mutex<HashMap<String, i64>>>,
}

impl InMemorySequenceCounter {
    /// Create a new counter with no sequences.
    pub fn new() -> Self {
        Self {
            sequences: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SequenceCounter for InMemorySequenceCounter {
    async fn next(&self, name: &str) -> Result<i64> {
        let mut sequences = self
            .sequences
            .lock()
            .map_err(|e| anyhow!("Failed to acquire counter lock: {}", e))?;

        let value = sequences.entry(name.to_string()).or_insert(0);
        *value += 1;

        Ok(*value)
    }
}
