//! # Dashboard Routes
//!
//! Read-only analytics over an implicit "now".
//!
//! ```text
//! GET /dashboard/summary       sales/profit per window (today, 7d, MTD)
//! GET /dashboard/top-products  top 5 sellers of the trailing 7 days
//! GET /dashboard/inventory     book value over active products
//! GET /dashboard/alerts        reorder alerts, most urgent first
//! ```

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use estok_core::analytics::ReorderAlert;
use estok_db::{DashboardSummary, InventorySummary, TopProduct, WindowSummary};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(summary))
        .route("/dashboard/top-products", get(top_products))
        .route("/dashboard/inventory", get(inventory))
        .route("/dashboard/alerts", get(alerts))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummaryDto {
    pub window_start: DateTime<Utc>,
    pub total_sales_cents: i64,
    pub profit_cents: i64,
    pub sale_count: i64,
    pub average_ticket_cents: i64,
}

impl From<WindowSummary> for WindowSummaryDto {
    fn from(w: WindowSummary) -> Self {
        WindowSummaryDto {
            window_start: w.window_start,
            total_sales_cents: w.total_sales_cents,
            profit_cents: w.profit_cents,
            sale_count: w.sale_count,
            average_ticket_cents: w.average_ticket_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummaryDto {
    pub today: WindowSummaryDto,
    pub last_7_days: WindowSummaryDto,
    pub month_to_date: WindowSummaryDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProductDto {
    pub product_id: String,
    pub description: String,
    pub quantity_sold_milli: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummaryDto {
    pub product_count: i64,
    pub total_quantity_milli: i64,
    pub stock_cost_value_cents: i64,
    pub stock_sale_value_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderAlertDto {
    pub product_id: String,
    pub description: String,
    pub quantity_milli: i64,
    pub sold_30d_milli: i64,
    pub daily_average_milli: i64,
    pub days_supply: f64,
}

impl From<ReorderAlert> for ReorderAlertDto {
    fn from(a: ReorderAlert) -> Self {
        ReorderAlertDto {
            product_id: a.product_id,
            description: a.description,
            quantity_milli: a.quantity_milli,
            sold_30d_milli: a.sold_30d_milli,
            daily_average_milli: a.daily_average_milli,
            days_supply: a.days_supply,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /dashboard/summary
async fn summary(State(state): State<AppState>) -> ApiResult<Json<DashboardSummaryDto>> {
    let summary: DashboardSummary = state.db.analytics().dashboard_summary(Utc::now()).await?;
    Ok(Json(DashboardSummaryDto {
        today: summary.today.into(),
        last_7_days: summary.last_7_days.into(),
        month_to_date: summary.month_to_date.into(),
    }))
}

/// GET /dashboard/top-products
async fn top_products(State(state): State<AppState>) -> ApiResult<Json<Vec<TopProductDto>>> {
    let top: Vec<TopProduct> = state.db.analytics().top_products(Utc::now()).await?;
    Ok(Json(
        top.into_iter()
            .map(|t| TopProductDto {
                product_id: t.product_id,
                description: t.description,
                quantity_sold_milli: t.quantity_sold_milli,
            })
            .collect(),
    ))
}

/// GET /dashboard/inventory
async fn inventory(State(state): State<AppState>) -> ApiResult<Json<InventorySummaryDto>> {
    let summary: InventorySummary = state.db.analytics().inventory_summary().await?;
    Ok(Json(InventorySummaryDto {
        product_count: summary.product_count,
        total_quantity_milli: summary.total_quantity_milli,
        stock_cost_value_cents: summary.stock_cost_value_cents,
        stock_sale_value_cents: summary.stock_sale_value_cents,
    }))
}

/// GET /dashboard/alerts
async fn alerts(State(state): State<AppState>) -> ApiResult<Json<Vec<ReorderAlertDto>>> {
    let alerts = state.db.analytics().reorder_alerts(Utc::now()).await?;
    Ok(Json(alerts.into_iter().map(ReorderAlertDto::from).collect()))
}
