//! ServerBuilder for fluent API to build the HTTP server

use crate::core::error::ApiError;
use crate::core::service::InvoiceStore;
use crate::server::AppState;
use crate::server::dashboard::{
    clear_invoices, debug_invoices, delete_invoice, get_invoice, list_invoices, update_invoice,
};
use crate::server::upload::upload_invoices;
use anyhow::{Result, anyhow};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum accepted request body, sized for spreadsheet uploads (10 MiB).
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builder for the invox HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// ServerBuilder::new()
///     .with_store(Arc::new(InMemoryInvoiceStore::new()))
///     .with_upload_dir("uploads")
///     .serve("0.0.0.0:5000")
///     .await?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn InvoiceStore>>,
    upload_dir: PathBuf,
    allowed_origins: Vec<String>,
}

impl ServerBuilder {
    /// Create a new builder with defaults (`uploads` dir, permissive CORS).
    pub fn new() -> Self {
        Self {
            store: None,
            upload_dir: PathBuf::from("uploads"),
            allowed_origins: Vec::new(),
        }
    }

    /// Set the invoice store backend. Required.
    pub fn with_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the directory where uploaded spreadsheet files are kept.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Restrict cross-origin callers to the given origins.
    ///
    /// An empty list keeps the permissive default (any origin).
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Build the router with all routes registered.
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("ServerBuilder requires a store; call with_store()"))?;

        let state = AppState {
            store,
            upload_dir: self.upload_dir,
        };

        let api = Router::new()
            .route("/invoices", get(list_invoices).delete(clear_invoices))
            .route("/invoices/debug", get(debug_invoices))
            .route(
                "/invoices/{id}",
                get(get_invoice).put(update_invoice).delete(delete_invoice),
            )
            .route("/invoice-upload", post(upload_invoices))
            .route("/health", get(health_check))
            .with_state(state);

        let app = Router::new()
            .nest("/api", api)
            .fallback(route_not_found)
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.allowed_origins))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

        Ok(app)
    }

    /// Serve the application with graceful shutdown.
    ///
    /// This will:
    /// - Ensure the upload directory exists
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let upload_dir = self.upload_dir.clone();
        let app = self.build()?;

        tokio::fs::create_dir_all(&upload_dir)
            .await
            .map_err(|e| anyhow!("Failed to create upload directory: {}", e))?;

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint handler.
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running"
    }))
}

/// JSON 404 for anything outside the API surface.
async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid origin in allow-list");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
