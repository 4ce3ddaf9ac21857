//! # Route Modules
//!
//! One module per resource, each exposing a `router()` merged here.

pub mod dashboard;
pub mod products;
pub mod sales;
pub mod stock;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(products::router())
        .merge(stock::router())
        .merge(sales::router())
        .merge(dashboard::router())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health - liveness: answers ok when the store answers.
async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    if state.db.health_check().await {
        Ok(Json(HealthResponse { status: "ok" }))
    } else {
        Err(ApiError::new(
            ErrorCode::DatabaseError,
            "Database is unavailable",
        ))
    }
}

/// Deserializes a present-but-possibly-null JSON field into
/// `Some(Option<T>)`, so absent fields stay `None` (via serde defaults) and
/// explicit nulls become `Some(None)`. Partial updates rely on the
/// distinction.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
