//! # Stock Routes
//!
//! Manual ledger operations: recording movements and reading the kardex.
//!
//! ```text
//! POST /stock/movement            record ENTRY/EXIT/ADJUST, 201
//! GET  /stock/kardex/{productId}  movement history, newest first
//! ```
//!
//! The SALE kind is rejected here: sale movements are created only by the
//! checkout transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use estok_core::{Movement, MovementKind, Quantity};

use crate::error::{ApiError, ApiResult};
use crate::routes::products::ProductDto;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stock/movement", post(record_movement))
        .route("/stock/kardex/{product_id}", get(kardex))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub product_id: String,
    /// "ENTRY", "EXIT" or "ADJUST" (case-insensitive).
    pub kind: String,
    /// For ENTRY/EXIT: the moved amount (sign ignored). For ADJUST: the new
    /// target quantity.
    pub quantity_milli: i64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: String,
    pub product_id: String,
    pub kind: MovementKind,
    pub quantity_before_milli: i64,
    pub quantity_delta_milli: i64,
    pub quantity_after_milli: i64,
    pub sale_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Movement> for MovementDto {
    fn from(m: Movement) -> Self {
        MovementDto {
            id: m.id,
            product_id: m.product_id,
            kind: m.kind,
            quantity_before_milli: m.quantity_before_milli,
            quantity_delta_milli: m.quantity_delta_milli,
            quantity_after_milli: m.quantity_after_milli,
            sale_id: m.sale_id,
            note: m.note,
            created_at: m.created_at,
        }
    }
}

/// The updated product together with the movement that updated it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub product: ProductDto,
    pub movement: MovementDto,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /stock/movement - apply one stock movement atomically.
async fn record_movement(
    State(state): State<AppState>,
    Json(payload): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<MovementResponse>)> {
    debug!(product_id = %payload.product_id, kind = %payload.kind, "record movement");

    let kind = MovementKind::from_str(&payload.kind)?;
    if kind == MovementKind::Sale {
        return Err(ApiError::validation(
            "kind must be one of: ENTRY, EXIT, ADJUST",
        ));
    }

    let (product, movement) = state
        .db
        .movements()
        .apply_movement(
            &payload.product_id,
            kind,
            Quantity::from_milli(payload.quantity_milli),
            payload.note,
            state.policy,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MovementResponse {
            product: ProductDto::from(product),
            movement: MovementDto::from(movement),
        }),
    ))
}

/// GET /stock/kardex/{product_id} - one product's movement history.
async fn kardex(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<MovementDto>>> {
    let movements = state.db.movements().kardex(&product_id).await?;
    Ok(Json(movements.into_iter().map(MovementDto::from).collect()))
}
