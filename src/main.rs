//! invox server binary

use anyhow::Result;
use invox::config::AppConfig;
use invox::core::service::InvoiceStore;
use invox::server::ServerBuilder;
use invox::storage::InMemoryInvoiceStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename("config.env").ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invox=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let store = select_store(&config).await?;

    tracing::info!(port = config.port, "Starting invox");

    ServerBuilder::new()
        .with_store(store)
        .with_upload_dir(config.upload_dir.clone())
        .with_allowed_origins(config.allowed_origins.clone())
        .serve(&config.listen_addr())
        .await
}

#[cfg(feature = "mongodb_backend")]
async fn select_store(config: &AppConfig) -> Result<Arc<dyn InvoiceStore>> {
    use invox::storage::mongodb;

    let Some(uri) = config.mongodb_uri.as_deref() else {
        tracing::warn!("MONGODB_URI not set; using in-memory store");
        return Ok(Arc::new(InMemoryInvoiceStore::new()));
    };

    let database = mongodb::connect(uri, &config.mongodb_db).await?;

    match mongodb::ping(&database).await {
        Ok(()) => tracing::info!(db = %config.mongodb_db, "Connected to MongoDB"),
        // Keep serving: requests fail individually until the store is back.
        Err(e) => tracing::error!(error = %e, "MongoDB unreachable at startup, continuing"),
    }

    Ok(Arc::new(mongodb::MongoInvoiceStore::new(database)))
}

#[cfg(not(feature = "mongodb_backend"))]
async fn select_store(config: &AppConfig) -> Result<Arc<dyn InvoiceStore>> {
    if config.mongodb_uri.is_some() {
        tracing::warn!(
            "MONGODB_URI is set but the mongodb_backend feature is disabled; using in-memory store"
        );
    }

    Ok(Arc::new(InMemoryInvoiceStore::new()))
}
