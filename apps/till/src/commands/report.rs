//! # Report Commands
//!
//! Sales and profit figures computed on demand from the sales snapshot.
//!
//! ```text
//! refresh_sales ──► SalesService::list_sales ──► SalesHistory.replace
//!
//! sales_report(window, now) ─┐
//! profit_report(now) ────────┼──► till_core::report over SalesHistory
//! profit_for_date(date, tz) ─┤     (nothing cached, O(n) per call)
//! dashboard(now) ────────────┘
//! ```
//!
//! Every command takes the current instant from the caller. Window
//! boundaries are local midnights in the time zone of `now`.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, info};

use till_core::report::{self, DashboardSummary, Window, WindowSummary};
use till_core::{Money, SaleRecord};

use crate::error::ApiResult;
use crate::state::Session;

/// Sales of one window, without cost or profit figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub window: Window,
    pub sales_count: usize,
    pub total_sales: Money,
    pub sales: Vec<SaleRecord>,
}

/// Fetches the sale history and replaces the session snapshot.
pub async fn refresh_sales(session: &Session) -> ApiResult<usize> {
    debug!("refresh_sales command");

    let records = session.sales_service().list_sales().await?;
    let count = records.len();
    info!(count, "Sales refreshed");
    session.sales.replace(records);
    Ok(count)
}

/// Sales in a window.
pub fn sales_report<Tz: TimeZone>(
    session: &Session,
    window: Window,
    now: &DateTime<Tz>,
) -> ApiResult<SalesReport> {
    debug!(window = %window, "sales_report command");

    session.sales.with_records(|records| -> ApiResult<SalesReport> {
        let bucket = report::bucket_for(records, window, now)?;
        Ok(SalesReport {
            window,
            sales_count: bucket.len(),
            total_sales: report::total_sales(bucket.iter().copied()),
            sales: bucket.into_iter().cloned().collect(),
        })
    })
}

/// Today's sales.
pub fn todays_sales<Tz: TimeZone>(
    session: &Session,
    now: &DateTime<Tz>,
) -> ApiResult<SalesReport> {
    sales_report(session, Window::Today, now)
}

/// Sales and profit for every window. Admin and manager only.
pub fn profit_report<Tz: TimeZone>(
    session: &Session,
    now: &DateTime<Tz>,
) -> ApiResult<Vec<WindowSummary>> {
    debug!("profit_report command");
    session.require_profit_access()?;

    Ok(session
        .sales
        .with_records(|records| report::summarize(records, now))?)
}

/// Profit of one local calendar day. Admin and manager only.
pub fn profit_for_date<Tz: TimeZone>(
    session: &Session,
    date: NaiveDate,
    tz: &Tz,
) -> ApiResult<Money> {
    debug!(date = %date, "profit_for_date command");
    session.require_profit_access()?;

    Ok(session
        .sales
        .with_records(|records| report::profit_on_date(records, date, tz))?)
}

/// Landing dashboard figures.
pub fn dashboard<Tz: TimeZone>(
    session: &Session,
    now: &DateTime<Tz>,
) -> ApiResult<DashboardSummary> {
    debug!("dashboard command");

    let products = session.catalog.snapshot();
    Ok(session
        .sales
        .with_records(|records| report::dashboard(records, &products, now))?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{product, session, session_with};
    use chrono::{FixedOffset, Utc};
    use till_client::{MockCatalogService, MockSalesService};
    use till_core::{PaymentMethod, Role, SaleItem};

    fn sale(id: &str, total: i64, cost: i64, at: Option<DateTime<Utc>>) -> SaleRecord {
        SaleRecord {
            id: Some(id.to_string()),
            cashier_id: Some("cashier-1".to_string()),
            items: vec![SaleItem {
                product_id: "1".to_string(),
                product_name: "Coffee".to_string(),
                price: Some(Money::from_major_minor(total, 0)),
                product_cost: Some(Money::from_major_minor(cost, 0)),
                quantity: Some(1),
            }],
            payment_method: PaymentMethod::Cash,
            timestamp: at,
            total: Money::from_major_minor(total, 0),
        }
    }

    fn nairobi() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn seeded(role: Role) -> Session {
        let session = session(role);
        let at = |d, h| Some(Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap());
        session.sales.replace(vec![
            // 16 Oct 10:00 local
            sale("a", 100, 60, at(16, 7)),
            // 15 Oct 23:30 local, the day before
            sale("b", 50, 20, Some(Utc.with_ymd_and_hms(2026, 10, 15, 20, 30, 0).unwrap())),
            // 2 Oct, same month, earlier week
            sale("c", 30, 10, at(2, 9)),
            sale("d", 999, 0, None),
        ]);
        session
    }

    fn now() -> DateTime<FixedOffset> {
        nairobi().with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_sales() {
        let mut sales = MockSalesService::new();
        sales
            .expect_list_sales()
            .times(1)
            .returning(|| Ok(vec![sale("x", 10, 5, None)]));
        let session = session_with(Role::Cashier, MockCatalogService::new(), sales);

        assert_eq!(refresh_sales(&session).await.unwrap(), 1);
        assert_eq!(session.sales.len(), 1);
    }

    #[test]
    fn test_sales_report_windows() {
        let session = seeded(Role::Cashier);

        let today = todays_sales(&session, &now()).unwrap();
        assert_eq!(today.sales_count, 1);
        assert_eq!(today.total_sales, Money::from_major_minor(100, 0));

        let month = sales_report(&session, Window::ThisMonth, &now()).unwrap();
        assert_eq!(month.sales_count, 3);

        let overall = sales_report(&session, Window::Overall, &now()).unwrap();
        assert_eq!(overall.sales_count, 4);
    }

    #[test]
    fn test_profit_report_is_gated() {
        let err = profit_report(&seeded(Role::Cashier), &now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let summaries = profit_report(&seeded(Role::Admin), &now()).unwrap();
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[0].window, Window::Today);
        assert_eq!(summaries[0].total_profit, Money::from_major_minor(40, 0));
    }

    #[test]
    fn test_profit_for_date() {
        let session = seeded(Role::Manager);
        let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();

        let profit = profit_for_date(&session, day, &nairobi()).unwrap();

        assert_eq!(profit, Money::from_major_minor(30, 0));
    }

    #[test]
    fn test_dashboard_reads_both_snapshots() {
        let session = seeded(Role::Cashier);
        let mut low = product("1", 10, 5, 1);
        low.reorder_point = 3;
        session.catalog.replace(vec![low, product("2", 10, 5, 40)]);

        let summary = dashboard(&session, &now()).unwrap();

        assert_eq!(summary.today_orders, 1);
        assert_eq!(summary.today_units, 1);
        assert_eq!(summary.low_stock.len(), 1);
        // 16 Oct 2026 is a Friday.
        assert_eq!(summary.weekday_totals[5], Money::from_major_minor(130, 0));
    }
}
