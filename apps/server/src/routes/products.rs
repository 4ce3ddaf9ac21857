//! # Product Routes
//!
//! Catalog CRUD, the uncapped management listing, and ranked search.
//!
//! ```text
//! POST /products          create, 201
//! PUT  /products/{id}     partial update, 200
//! GET  /products/all      every active product, uncapped (management views)
//! GET  /products?q=&limit ranked search, capped (point-of-sale entry)
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use estok_core::{NewProduct, Product, ProductPatch, DEFAULT_SEARCH_LIMIT};

use crate::error::{ApiError, ApiResult};
use crate::routes::double_option;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(create).get(search))
        .route("/products/all", get(list_all))
        .route("/products/{id}", put(update))
}

// =============================================================================
// DTOs
// =============================================================================

/// Product as seen by HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub description: String,
    pub ean13: Option<String>,
    pub aux_code: Option<String>,
    pub quantity_milli: i64,
    pub cost_cents: Option<i64>,
    pub price_cents: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            description: p.description,
            ean13: p.ean13,
            aux_code: p.aux_code,
            quantity_milli: p.quantity_milli,
            cost_cents: p.cost_cents,
            price_cents: p.price_cents,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub description: String,
    pub ean13: Option<String>,
    pub aux_code: Option<String>,
    /// Starting quantity in milliunits; defaults to 0.
    pub initial_quantity_milli: Option<i64>,
    pub cost_cents: Option<i64>,
    pub price_cents: Option<i64>,
}

/// Partial update. Absent fields are left untouched; explicit nulls clear
/// nullable fields. Quantity is not updatable here - record an ADJUST
/// movement instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub ean13: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub aux_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cost_cents: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_cents: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search term; empty or absent returns the default listing.
    pub q: Option<String>,
    /// Result cap; defaults to 20, hard-capped at 100.
    pub limit: Option<usize>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /products - create a product.
async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductDto>)> {
    debug!(description = %payload.description, "create product");

    let product = state
        .db
        .products()
        .create(NewProduct {
            description: payload.description,
            ean13: payload.ean13,
            aux_code: payload.aux_code,
            initial_quantity_milli: payload.initial_quantity_milli.unwrap_or(0),
            cost_cents: payload.cost_cents,
            price_cents: payload.price_cents,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProductDto::from(product))))
}

/// PUT /products/{id} - partial update.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductDto>> {
    debug!(id = %id, "update product");

    let patch = ProductPatch {
        description: payload.description,
        ean13: payload.ean13,
        aux_code: payload.aux_code,
        cost_cents: payload.cost_cents,
        price_cents: payload.price_cents,
        is_active: payload.is_active,
    };

    if patch.is_empty() {
        return Err(ApiError::validation("No input data provided"));
    }

    let product = state.db.products().update(&id, patch).await?;
    Ok(Json(ProductDto::from(product)))
}

/// GET /products/all - every active product, ordered by description, no cap.
async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().list_active().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// GET /products?q=term&limit=20 - ranked search for sale-screen entry.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<ProductDto>>> {
    let term = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(100);

    debug!(term = %term, limit, "search products");

    let products = state.db.products().search(&term, limit).await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}
