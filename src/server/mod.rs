//! HTTP server: router construction and request handlers
//!
//! The router exposes the dashboard CRUD routes and the batch upload route
//! under the `/api` prefix, plus a health probe and a JSON 404 fallback.

pub mod builder;
pub mod dashboard;
pub mod upload;

use crate::core::service::InvoiceStore;
use std::path::PathBuf;
use std::sync::Arc;

pub use builder::ServerBuilder;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Invoice persistence backend.
    pub store: Arc<dyn InvoiceStore>,

    /// Directory where uploaded spreadsheet files are kept.
    pub upload_dir: PathBuf,
}
