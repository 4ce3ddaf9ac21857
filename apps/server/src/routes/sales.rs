//! # Sale Routes
//!
//! Checkout and sale retrieval.
//!
//! ```text
//! POST /sales        atomic multi-line checkout, 201
//! GET  /sales/{id}   sale with its lines
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use estok_core::NewSaleLine;
use estok_db::{DbError, SaleRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/{id}", get(get_sale))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity_milli: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub lines: Vec<SaleLineRequest>,
    /// Client-declared total; compared against the server-computed sum for
    /// anomaly detection, never persisted.
    pub total_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleResponse {
    pub sale_id: String,
    pub line_count: usize,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineDto {
    pub id: String,
    pub product_id: String,
    pub quantity_milli: i64,
    pub unit_cost_cents: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLineDto>,
}

impl From<SaleRecord> for SaleDto {
    fn from(record: SaleRecord) -> Self {
        SaleDto {
            id: record.sale.id,
            total_cents: record.sale.total_cents,
            created_at: record.sale.created_at,
            lines: record
                .lines
                .into_iter()
                .map(|l| SaleLineDto {
                    id: l.id,
                    product_id: l.product_id,
                    quantity_milli: l.quantity_milli,
                    unit_cost_cents: l.unit_cost_cents,
                    unit_price_cents: l.unit_price_cents,
                    line_total_cents: l.line_total_cents,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /sales - process a checkout; all lines commit or none do.
async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<CreateSaleResponse>)> {
    debug!(lines = payload.lines.len(), "create sale");

    let lines: Vec<NewSaleLine> = payload
        .lines
        .into_iter()
        .map(|l| NewSaleLine {
            product_id: l.product_id,
            quantity_milli: l.quantity_milli,
            unit_price_cents: l.unit_price_cents,
        })
        .collect();

    let receipt = state
        .db
        .sales()
        .create_sale(lines, payload.total_cents, state.policy)
        .await
        .map_err(|err| match err {
            // A bad line is a bad request: the client sent a reference the
            // checkout cannot honor, and nothing was persisted.
            DbError::NotFound { entity, id } => {
                ApiError::validation(format!("{} {} not found", entity, id))
            }
            other => ApiError::from(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSaleResponse {
            sale_id: receipt.sale_id,
            line_count: receipt.line_count,
            total_cents: receipt.total_cents,
        }),
    ))
}

/// GET /sales/{id} - a sale with its ordered lines.
async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDto>> {
    let record = state
        .db
        .sales()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;

    Ok(Json(SaleDto::from(record)))
}
