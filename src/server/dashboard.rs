//! Dashboard HTTP handlers: list, get, update, delete over invoice records
//!
//! Every record leaving these handlers passes through the redaction scrub
//! (`core::redact`), so server-minted references from legacy documents never
//! reach a client.

use crate::core::error::ApiError;
use crate::core::invoice::InvoiceRecord;
use crate::core::redact::redact;
use crate::core::rows::NORMALIZED_NUMBER_KEY;
use crate::server::AppState;
use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Body of a `PUT /api/invoices/{id}` request.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// Replacement payload; the previous payload is discarded entirely.
    pub data: Map<String, Value>,
}

/// Body of a `DELETE /api/invoices` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub cleared_count: u64,
}

/// Record ids are opaque; anything that does not parse addresses nothing.
fn parse_record_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invoice_not_found())
}

/// `GET /api/invoices`: all records, newest first, redacted.
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceRecord>>, ApiError> {
    let records = state.store.find_all().await?;
    Ok(Json(records.into_iter().map(redact).collect()))
}

/// `GET /api/invoices/{id}`: a single redacted record.
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceRecord>, ApiError> {
    let id = parse_record_id(&id)?;
    let record = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(ApiError::invoice_not_found)?;

    Ok(Json(redact(record)))
}

/// `PUT /api/invoices/{id}`: whole-payload replace.
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceRecord>, ApiError> {
    let id = parse_record_id(&id)?;
    let updated = state
        .store
        .update_by_id(&id, body.data)
        .await?
        .ok_or_else(ApiError::invoice_not_found)?;

    Ok(Json(redact(updated)))
}

/// `DELETE /api/invoices/{id}`: remove one record.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_record_id(&id)?;
    if !state.store.delete_by_id(&id).await? {
        return Err(ApiError::invoice_not_found());
    }

    Ok(Json(json!({ "success": true })))
}

/// `DELETE /api/invoices`: administrative reset of the whole collection.
pub async fn clear_invoices(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, ApiError> {
    let cleared = state.store.delete_all().await?;
    tracing::info!(cleared, "cleared all invoices");

    Ok(Json(ClearResponse {
        success: true,
        message: format!("All {} invoices cleared", cleared),
        cleared_count: cleared,
    }))
}

/// `GET /api/invoices/debug`: raw field presence per record, for diagnosing
/// uploads whose number column did not resolve.
pub async fn debug_invoices(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.store.find_all().await?;

    let summaries: Vec<Value> = records
        .iter()
        .map(|record| {
            json!({
                "id": record.id,
                "createdAt": record.created_at,
                "dataKeys": record.data.keys().collect::<Vec<_>>(),
                "hasInvoiceNo": record.data.contains_key(NORMALIZED_NUMBER_KEY),
                "sourceFile": record.source_file,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "totalInvoices": summaries.len(),
        "records": summaries,
    })))
}
