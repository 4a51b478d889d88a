//! Batch upload handler
//!
//! Accepts a multipart request carrying the parsed spreadsheet rows
//! (`invoiceData`, a JSON object or array) and optionally the spreadsheet
//! file itself (`excel`). Rows are persisted one at a time; a bad row lands
//! in the failure report and never aborts the rest of the batch.

use crate::core::error::ApiError;
use crate::core::invoice::InvoiceRecord;
use crate::core::rows::{self, NORMALIZED_NUMBER_KEY, NUMBER_COLUMN};
use crate::server::AppState;
use anyhow::anyhow;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Multipart field carrying the JSON-encoded rows.
const ROWS_FIELD: &str = "invoiceData";

/// Multipart field carrying the uploaded spreadsheet file.
const FILE_FIELD: &str = "excel";

/// Batch report returned by `POST /api/invoice-upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// External numbers of the rows that were stored, in input order.
    pub invoice_numbers: Vec<String>,
    pub total_invoices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_invoices: Option<Vec<FailedRow>>,
}

/// One rejected row: its position in the batch and the reason.
#[derive(Debug, Serialize)]
pub struct FailedRow {
    pub index: usize,
    pub error: String,
}

/// `POST /api/invoice-upload`: persist one record per uploaded row.
pub async fn upload_invoices(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut raw_rows: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart read error: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            ROWS_FIELD => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read {}: {}", ROWS_FIELD, e))
                })?;
                raw_rows = Some(text);
            }
            FILE_FIELD => {
                let name = field.file_name().unwrap_or("spreadsheet.xlsx").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload body: {}", e)))?;
                file = Some((name, data));
            }
            _ => {}
        }
    }

    let raw_rows = raw_rows
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {} field", ROWS_FIELD)))?;

    // Malformed batch input fails the whole request before any row is touched.
    let batch = rows::parse_batch(&raw_rows).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let source_file = match &file {
        Some((name, data)) => Some(store_upload(&state.upload_dir, name, data).await?),
        None => None,
    };

    let mut invoice_numbers = Vec::new();
    let mut failed = Vec::new();

    for (index, mut row) in batch.into_iter().enumerate() {
        let Some(number) = rows::external_number(&row) else {
            tracing::warn!(
                index,
                columns = ?row.keys().collect::<Vec<_>>(),
                "row has no {} column, skipping",
                NUMBER_COLUMN
            );
            failed.push(FailedRow {
                index,
                error: format!("missing external invoice number column \"{}\"", NUMBER_COLUMN),
            });
            continue;
        };

        row.insert(
            NORMALIZED_NUMBER_KEY.to_string(),
            Value::String(number.clone()),
        );

        let mut record = InvoiceRecord::new(row);
        if let Some(path) = &source_file {
            record = record.with_source_file(path.clone());
        }

        match state.store.insert(record).await {
            Ok(_) => invoice_numbers.push(number),
            Err(e) => {
                tracing::error!(index, error = %e, "failed to persist invoice row");
                failed.push(FailedRow {
                    index,
                    error: e.to_string(),
                });
            }
        }
    }

    let total = invoice_numbers.len();
    tracing::info!(stored = total, rejected = failed.len(), "processed invoice upload");

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Successfully processed {} invoices", total),
        invoice_numbers,
        total_invoices: total,
        failed_invoices: (!failed.is_empty()).then_some(failed),
    }))
}

/// Write the uploaded file under the upload directory with a unique,
/// traversal-safe name, and return the stored path.
async fn store_upload(dir: &Path, original_name: &str, data: &[u8]) -> Result<String, ApiError> {
    let file_name = format!("{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(original_name));
    let path = dir.join(&file_name);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Storage(anyhow!("Failed to create upload directory: {}", e)))?;
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| ApiError::Storage(anyhow!("Failed to store uploaded file: {}", e)))?;

    Ok(path.to_string_lossy().into_owned())
}

/// Keep the basename only and strip everything outside a small allow-set,
/// so a hostile filename header cannot escape the upload directory.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let safe: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect();

    let safe = safe.trim();
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        "spreadsheet.xlsx".to_string()
    } else {
        safe.to_string()
    }
}
