//! # Sales Summary
//!
//! Daily, weekly and monthly totals over a set of sales.
//!
//! Periods are measured in UTC against a caller-supplied `now`:
//! - daily: same calendar day as `now`
//! - weekly: `created_at >= now - 7 days`
//! - monthly: same calendar year and month as `now`
//!
//! `quantity` adds raw sale quantities regardless of unit, so it is a
//! count of line units sold rather than a stock measure.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Sale;

/// Totals for one reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    #[ts(type = "number")]
    pub count: u64,
    pub quantity: f64,
    pub revenue: f64,
}

impl PeriodTotals {
    fn add(&mut self, sale: &Sale) {
        self.count += 1;
        self.quantity += sale.quantity;
        self.revenue += sale.total_price;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub daily: PeriodTotals,
    pub weekly: PeriodTotals,
    pub monthly: PeriodTotals,
}

/// Aggregates `sales` into daily, weekly and monthly totals.
pub fn summarize<'a>(sales: impl IntoIterator<Item = &'a Sale>, now: DateTime<Utc>) -> SalesSummary {
    let today = now.date_naive();
    let week_start = now - Duration::days(7);

    let mut summary = SalesSummary::default();
    for sale in sales {
        let at = sale.created_at;
        if at.date_naive() == today {
            summary.daily.add(sale);
        }
        if at >= week_start {
            summary.weekly.add(sale);
        }
        if at.year() == now.year() && at.month() == now.month() {
            summary.monthly.add(sale);
        }
    }
    summary
}

/// The UTC day containing `now`, as a half-open `[start, end)` range.
pub fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Start of the earliest period [`summarize`] looks at.
///
/// Lets the database narrow the scan before summarizing.
pub fn summary_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let month_start = now
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive())
        .and_time(NaiveTime::MIN)
        .and_utc();
    month_start.min(now - Duration::days(7))
}

// =============================================================================
// Unit Tests
// =============================================================================
