//! # Analytics Derivations
//!
//! Pure math behind the dashboard: time-window boundaries, average ticket,
//! exact profit reduction, and the days-of-supply reorder signal. The SQL
//! aggregates live in the database crate; everything here is deterministic
//! arithmetic over an explicit `now`, so each formula is unit-testable
//! without a store.

use chrono::{DateTime, Datelike, Days, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{div_round, round_cents_milli};

/// Trailing window for the sales-velocity signal, in whole days (an integer
/// window, not a calendar month).
pub const VELOCITY_WINDOW_DAYS: i64 = 30;

/// Coverage threshold: a product with fewer days of supply than this is
/// flagged for reorder.
pub const COVERAGE_ALERT_DAYS: i64 = 7;

/// How many products the top-sellers ranking returns.
pub const TOP_PRODUCTS_LIMIT: u32 = 5;

// =============================================================================
// Dashboard Windows
// =============================================================================

/// Start instants of the three dashboard windows, derived from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindows {
    /// Midnight (UTC) of the current day.
    pub today: DateTime<Utc>,
    /// Exactly 7 x 24h before `now`.
    pub last_7_days: DateTime<Utc>,
    /// Midnight (UTC) of the first day of the current month.
    pub month_to_date: DateTime<Utc>,
}

impl DashboardWindows {
    /// Computes the window starts for a given point in time.
    pub fn at(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let month_start = date - Days::new(u64::from(date.day0()));

        DashboardWindows {
            today: date.and_time(NaiveTime::MIN).and_utc(),
            last_7_days: now - Duration::days(7),
            month_to_date: month_start.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

/// Start of the trailing velocity window (30 x 24h before `now`).
pub fn velocity_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(VELOCITY_WINDOW_DAYS)
}

// =============================================================================
// Window Summary Math
// =============================================================================

/// Average ticket in cents: total sales over sale count, zero when the
/// window is empty (never a division error).
pub fn average_ticket_cents(total_cents: i64, sale_count: i64) -> i64 {
    if sale_count <= 0 {
        return 0;
    }
    div_round(total_cents, sale_count)
}

/// Reduces a summed profit numerator to cents.
///
/// Per-line profit is `(unit_price - unit_cost_at_sale) x quantity`; lines
/// are summed in the raw cents-milliunits scale and rounded once here, so
/// multi-line windows carry no per-line rounding drift.
pub fn profit_cents(summed_numerator_milli: i128) -> i64 {
    round_cents_milli(summed_numerator_milli)
}

// =============================================================================
// Reorder Alerts
// =============================================================================

/// Velocity input for one product: current stock plus what the trailing
/// 30-day window sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VelocityInput {
    pub product_id: String,
    pub description: String,
    pub quantity_milli: i64,
    pub sold_30d_milli: i64,
}

/// A reorder alert: the product's coverage dropped under the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderAlert {
    pub product_id: String,
    pub description: String,
    pub quantity_milli: i64,
    pub sold_30d_milli: i64,
    /// Average units sold per day over the window, in milliunits.
    pub daily_average_milli: i64,
    /// Coverage in days (reporting value; ordering and the threshold are
    /// decided with exact integer arithmetic, not with this float).
    pub days_supply: f64,
}

/// Whether coverage is under the alert threshold, decided exactly:
/// `quantity / (sold / 30) < 7`  <=>  `quantity * 30 < sold * 7`.
fn under_coverage_threshold(quantity_milli: i64, sold_30d_milli: i64) -> bool {
    (quantity_milli as i128) * (VELOCITY_WINDOW_DAYS as i128)
        < (sold_30d_milli as i128) * (COVERAGE_ALERT_DAYS as i128)
}

/// Computes reorder alerts from per-product velocity inputs.
///
/// Products without stock or without sales in the window are skipped (no
/// velocity signal is not an error). Alerts are sorted most urgent first;
/// the ordering compares cross-multiplied integers so equal-coverage
/// products tie exactly.
pub fn reorder_alerts(inputs: Vec<VelocityInput>) -> Vec<ReorderAlert> {
    let mut alerts: Vec<ReorderAlert> = inputs
        .into_iter()
        .filter(|input| input.quantity_milli > 0 && input.sold_30d_milli > 0)
        .filter(|input| under_coverage_threshold(input.quantity_milli, input.sold_30d_milli))
        .map(|input| {
            let daily_average_milli = div_round(input.sold_30d_milli, VELOCITY_WINDOW_DAYS);
            let days_supply = input.quantity_milli as f64 * VELOCITY_WINDOW_DAYS as f64
                / input.sold_30d_milli as f64;
            ReorderAlert {
                product_id: input.product_id,
                description: input.description,
                quantity_milli: input.quantity_milli,
                sold_30d_milli: input.sold_30d_milli,
                daily_average_milli,
                days_supply,
            }
        })
        .collect();

    alerts.sort_by(|a, b| {
        let lhs = a.quantity_milli as i128 * b.sold_30d_milli as i128;
        let rhs = b.quantity_milli as i128 * a.sold_30d_milli as i128;
        lhs.cmp(&rhs).then_with(|| a.product_id.cmp(&b.product_id))
    });

    alerts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dashboard_windows() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap();
        let windows = DashboardWindows::at(now);

        assert_eq!(windows.today, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(
            windows.last_7_days,
            Utc.with_ymd_and_hms(2026, 3, 8, 14, 30, 0).unwrap()
        );
        assert_eq!(
            windows.month_to_date,
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_month_to_date_on_the_first() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 5, 0).unwrap();
        let windows = DashboardWindows::at(now);
        assert_eq!(
            windows.month_to_date,
            Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(windows.today, windows.month_to_date);
    }

    #[test]
    fn test_velocity_window_is_thirty_whole_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(
            velocity_window_start(now),
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_average_ticket_zero_sales_is_zero() {
        assert_eq!(average_ticket_cents(0, 0), 0);
        assert_eq!(average_ticket_cents(12345, 0), 0);
    }

    #[test]
    fn test_average_ticket_rounds() {
        assert_eq!(average_ticket_cents(1000, 3), 333);
        assert_eq!(average_ticket_cents(2000, 3), 667);
    }

    #[test]
    fn test_profit_reduction_is_exact() {
        // Two lines: (5.00 - 3.00) x 1.5 and (2.00 - 1.00) x 0.25
        let numerator = (500 - 300) as i128 * 1_500 + (200 - 100) as i128 * 250;
        assert_eq!(profit_cents(numerator), 325);
    }

    #[test]
    fn test_alert_spec_examples() {
        // quantity=10, sold=60 -> dailyAverage=2, daysSupply=5 -> alerted
        // quantity=100, sold=30 -> daysSupply=100 -> not alerted
        let alerts = reorder_alerts(vec![
            VelocityInput {
                product_id: "fast".to_string(),
                description: "Fast mover".to_string(),
                quantity_milli: 10_000,
                sold_30d_milli: 60_000,
            },
            VelocityInput {
                product_id: "slow".to_string(),
                description: "Slow mover".to_string(),
                quantity_milli: 100_000,
                sold_30d_milli: 30_000,
            },
        ]);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].product_id, "fast");
        assert_eq!(alerts[0].daily_average_milli, 2_000);
        assert!((alerts[0].days_supply - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_velocity_signal_is_skipped_not_an_error() {
        let alerts = reorder_alerts(vec![
            VelocityInput {
                product_id: "dormant".to_string(),
                description: "No sales".to_string(),
                quantity_milli: 5_000,
                sold_30d_milli: 0,
            },
            VelocityInput {
                product_id: "returned".to_string(),
                description: "Net negative sales".to_string(),
                quantity_milli: 5_000,
                sold_30d_milli: -2_000,
            },
        ]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_alerts_sorted_most_urgent_first() {
        let alerts = reorder_alerts(vec![
            VelocityInput {
                product_id: "b".to_string(),
                description: "Three days left".to_string(),
                quantity_milli: 3_000,
                sold_30d_milli: 30_000,
            },
            VelocityInput {
                product_id: "a".to_string(),
                description: "One day left".to_string(),
                quantity_milli: 1_000,
                sold_30d_milli: 30_000,
            },
        ]);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].product_id, "a");
        assert_eq!(alerts[1].product_id, "b");
    }

    #[test]
    fn test_exact_threshold_boundary() {
        // Exactly 7 days of supply is NOT under the threshold
        let alerts = reorder_alerts(vec![VelocityInput {
            product_id: "boundary".to_string(),
            description: "Seven days".to_string(),
            quantity_milli: 7_000,
            sold_30d_milli: 30_000,
        }]);
        assert!(alerts.is_empty());
    }
}
