//! # invox
//!
//! A small CRUD backend for invoice records extracted from uploaded
//! spreadsheet files. Parsed rows arrive together with the spreadsheet in a
//! multipart request; each row is persisted as one invoice document, and the
//! dashboard routes expose list/get/update/delete over the stored records.
//!
//! ## Design points
//!
//! - **Open row payloads**: spreadsheet rows carry whatever columns the
//!   export produced, so payloads are schema-less JSON maps.
//! - **External numbers are authoritative**: the spreadsheet's `In_no`
//!   column is the invoice number clients see. The server never mints one;
//!   the outbound scrub in [`core::redact`] removes minted references left
//!   over from legacy data.
//! - **Pluggable storage**: an in-memory store for development and tests
//!   (default feature `in-memory`) and a MongoDB backend behind the
//!   `mongodb_backend` feature.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use invox::prelude::*;
//!
//! let store = Arc::new(InMemoryInvoiceStore::new());
//! ServerBuilder::new()
//!     .with_store(store)
//!     .serve("0.0.0.0:5000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::ApiError,
        invoice::InvoiceRecord,
        redact::{is_minted_reference, minted_reference, redact},
        rows::{NORMALIZED_NUMBER_KEY, NUMBER_COLUMN},
        service::{InvoiceStore, SequenceCounter},
    };

    // === Storage ===
    pub use crate::storage::{InMemoryInvoiceStore, InMemorySequenceCounter};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoInvoiceStore, MongoSequenceCounter};

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
