//! Core module containing the invoice model, row handling, and service traits

pub mod error;
pub mod invoice;
pub mod redact;
pub mod rows;
pub mod service;

pub use error::ApiError;
pub use invoice::InvoiceRecord;
pub use service::{InvoiceStore, SequenceCounter};
