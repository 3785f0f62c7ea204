//! # Sales Reports
//!
//! Time-window bucketing, sales sums and profit figures over a snapshot of
//! sale records.
//!
//! ## Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reporting Windows (local time of `now`)              │
//! │                                                                         │
//! │   Sun   Mon   Tue   Wed   Thu   Fri   Sat   Sun                         │
//! │    │◄──────────────── ThisWeek ───────────────►│                        │
//! │                                 │◄─Today─►│                             │
//! │                                                                         │
//! │   1st ─────────────────── ThisMonth ─────────────────► 1st of next      │
//! │                                                                         │
//! │   Overall: every record, including those without a timestamp            │
//! │                                                                         │
//! │   All dated windows are half-open: [start, end)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here reads the clock: every function that needs "now" takes it
//! as an argument, and the window boundaries are computed in `now`'s own
//! time zone. Nothing is cached; every call is a single O(n) pass.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReportError, ReportResult};
use crate::money::Money;
use crate::types::{Product, SaleRecord};

// =============================================================================
// Window
// =============================================================================

/// A reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Today,
    ThisWeek,
    ThisMonth,
    Overall,
}

impl Window {
    /// Every window, in display order.
    pub const ALL: [Window; 4] = [
        Window::Today,
        Window::ThisWeek,
        Window::ThisMonth,
        Window::Overall,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Window::Today => "Today",
            Window::ThisWeek => "This week",
            Window::ThisMonth => "This month",
            Window::Overall => "Overall",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Window::Today),
            "week" | "this_week" | "this-week" => Ok(Window::ThisWeek),
            "month" | "this_month" | "this-month" => Ok(Window::ThisMonth),
            "overall" | "all" => Ok(Window::Overall),
            other => Err(format!(
                "unknown window '{}' (expected today, week, month or overall)",
                other
            )),
        }
    }
}

// =============================================================================
// Window Boundaries
// =============================================================================

/// Half-open UTC range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Range {
    #[inline]
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

/// Resolves `date` 00:00 in `tz` to an instant.
///
/// A midnight that falls in a DST fold resolves to its earlier instant; one
/// that falls in a gap does not exist and is an error.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> ReportResult<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(ReportError::AmbiguousLocalTime { date })
}

fn day_range<Tz: TimeZone>(tz: &Tz, first: NaiveDate, after_last: NaiveDate) -> ReportResult<Range> {
    Ok(Range {
        start: local_midnight(tz, first)?,
        end: local_midnight(tz, after_last)?,
    })
}

/// Returns the instant range of `window` around `now`, or `None` for
/// [`Window::Overall`] which is unbounded.
pub fn window_range<Tz: TimeZone>(window: Window, now: &DateTime<Tz>) -> ReportResult<Option<Range>> {
    let tz = now.timezone();
    let today = now.date_naive();

    let range = match window {
        Window::Today => day_range(&tz, today, today + Days::new(1))?,
        Window::ThisWeek => {
            let sunday = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
            day_range(&tz, sunday, sunday + Days::new(7))?
        }
        Window::ThisMonth => {
            let first = today - Days::new(u64::from(today.day0()));
            day_range(&tz, first, first + Months::new(1))?
        }
        Window::Overall => return Ok(None),
    };

    Ok(Some(range))
}

// =============================================================================
// Bucketing
// =============================================================================

/// Records falling in `window`, in input order.
///
/// Records without a timestamp only ever appear in [`Window::Overall`].
///
/// ## Errors
/// `AmbiguousLocalTime` when a window boundary does not exist in the time
/// zone of `now`. An unresolvable window is never reported as empty.
pub fn bucket_for<'a, Tz: TimeZone>(
    records: &'a [SaleRecord],
    window: Window,
    now: &DateTime<Tz>,
) -> ReportResult<Vec<&'a SaleRecord>> {
    let bucket = match window_range(window, now)? {
        None => records.iter().collect(),
        Some(range) => in_range(records, range),
    };
    Ok(bucket)
}

/// Records of a single local calendar day in `tz`.
pub fn sales_on_date<'a, Tz: TimeZone>(
    records: &'a [SaleRecord],
    date: NaiveDate,
    tz: &Tz,
) -> ReportResult<Vec<&'a SaleRecord>> {
    let range = day_range(tz, date, date + Days::new(1))?;
    Ok(in_range(records, range))
}

fn in_range(records: &[SaleRecord], range: Range) -> Vec<&SaleRecord> {
    records
        .iter()
        .filter(|record| record.timestamp.as_ref().is_some_and(|ts| range.contains(ts)))
        .collect()
}

// =============================================================================
// Sums
// =============================================================================

/// Σ record.total.
pub fn total_sales<'a>(records: impl IntoIterator<Item = &'a SaleRecord>) -> Money {
    records.into_iter().map(|record| record.total).sum()
}

/// Σ over records of Σ over items of (price − cost) × quantity.
///
/// An item missing price, cost or quantity contributes zero. Profit is
/// linear: the profit of two disjoint sets is the sum of their profits.
pub fn total_profit<'a>(records: impl IntoIterator<Item = &'a SaleRecord>) -> Money {
    records.into_iter().map(sale_profit).sum()
}

/// Profit of a single sale.
#[inline]
pub fn sale_profit(record: &SaleRecord) -> Money {
    record.profit()
}

/// Profit of every sale on a local calendar day.
pub fn profit_on_date<Tz: TimeZone>(
    records: &[SaleRecord],
    date: NaiveDate,
    tz: &Tz,
) -> ReportResult<Money> {
    Ok(total_profit(sales_on_date(records, date, tz)?))
}

// =============================================================================
// Summaries
// =============================================================================

/// Totals for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub window: Window,
    pub sales_count: usize,
    pub total_sales: Money,
    pub total_profit: Money,
}

/// Summarizes a single window.
pub fn summarize_window<Tz: TimeZone>(
    records: &[SaleRecord],
    window: Window,
    now: &DateTime<Tz>,
) -> ReportResult<WindowSummary> {
    let bucket = bucket_for(records, window, now)?;
    Ok(WindowSummary {
        window,
        sales_count: bucket.len(),
        total_sales: total_sales(bucket.iter().copied()),
        total_profit: total_profit(bucket.iter().copied()),
    })
}

/// Summaries for all four windows, in [`Window::ALL`] order.
pub fn summarize<Tz: TimeZone>(
    records: &[SaleRecord],
    now: &DateTime<Tz>,
) -> ReportResult<Vec<WindowSummary>> {
    Window::ALL
        .iter()
        .map(|window| summarize_window(records, *window, now))
        .collect()
}

/// Figures for the landing dashboard.
///
/// ```text
/// ┌──────────────┬──────────────┬──────────────┬──────────────┐
/// │ Today total  │ Orders today │ Units today  │  Low stock   │
/// └──────────────┴──────────────┴──────────────┴──────────────┘
/// ┌─────────────────────────────────────────────────────────────┐
/// │  Sun  Mon  Tue  Wed  Thu  Fri  Sat   (sales per weekday)    │
/// └─────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today_total: Money,
    pub today_orders: usize,
    pub today_units: i64,

    /// Products with `quantity < reorder_point`.
    pub low_stock: Vec<Product>,

    /// Sales totals per local weekday, index 0 = Sunday.
    pub weekday_totals: [Money; 7],
}

/// Builds the dashboard from the sales and catalog snapshots.
pub fn dashboard<Tz: TimeZone>(
    records: &[SaleRecord],
    products: &[Product],
    now: &DateTime<Tz>,
) -> ReportResult<DashboardSummary> {
    let today = bucket_for(records, Window::Today, now)?;
    let tz = now.timezone();

    let mut weekday_totals = [Money::zero(); 7];
    for record in records {
        if let Some(ts) = &record.timestamp {
            let weekday = ts.with_timezone(&tz).weekday().num_days_from_sunday() as usize;
            weekday_totals[weekday] += record.total;
        }
    }

    Ok(DashboardSummary {
        today_total: total_sales(today.iter().copied()),
        today_orders: today.len(),
        today_units: today.iter().map(|record| record.units()).sum(),
        low_stock: low_stock(products),
        weekday_totals,
    })
}

/// Products at or below their reorder threshold (`quantity < reorder_point`).
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|product| product.is_low_stock())
        .cloned()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
