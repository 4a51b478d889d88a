//! Environment-driven configuration

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Runtime configuration, read from the environment.
///
/// Recognized variables:
/// - `MONGODB_URI`: document store connection string. Unset means the
///   in-memory store is used (development mode).
/// - `MONGODB_DB`: database name, default `invox`.
/// - `PORT`: listen port, default 5000.
/// - `UPLOAD_DIR`: directory for stored spreadsheet uploads, default
///   `uploads`.
/// - `ALLOWED_ORIGINS`: comma-separated CORS origin allow-list. Unset or
///   `*` allows any origin.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: Option<String>,
    pub mongodb_db: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            Err(_) => 5000,
        };

        Ok(Self {
            mongodb_uri: std::env::var("MONGODB_URI").ok().filter(|s| !s.is_empty()),
            mongodb_db: std::env::var("MONGODB_DB").unwrap_or_else(|_| "invox".to_string()),
            port,
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            allowed_origins: parse_origins(std::env::var("ALLOWED_ORIGINS").ok().as_deref()),
        })
    }

    /// Socket address string to bind the listener to.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Split the allow-list variable into origins.
///
/// An unset variable, an empty string, or a `*` entry all mean "allow any
/// origin", represented as an empty list.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        return Vec::new();
    }

    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_unset_allows_any() {
        assert!(parse_origins(None).is_empty());
        assert!(parse_origins(Some("")).is_empty());
    }

    #[test]
    fn parse_origins_wildcard_allows_any() {
        assert!(parse_origins(Some("*")).is_empty());
        assert!(parse_origins(Some("https://app.example.com, *")).is_empty());
    }

    #[test]
    fn parse_origins_splits_and_trims() {
        let origins = parse_origins(Some("https://app.example.com , http://localhost:3000"));
        assert_eq!(
            origins,
            vec![
                "https://app.example.com".to_string(),
                "http://localhost:3000".to_string()
            ]
        );
    }
}
