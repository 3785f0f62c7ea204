//! # Command-Line Front End
//!
//! Parses arguments, opens a [`Session`] and drives the commands.
//!
//! ```text
//! till [--config PATH] [--cashier ID] [--role ROLE] <COMMAND>
//!
//!   products [--search Q]         catalog listing
//!   low-stock                     products below their reorder point
//!   report [--window W]           sales for today|week|month|overall
//!   profit [--date YYYY-MM-DD]    profit per window, or for one day
//!   dashboard                     today's figures, weekday totals
//!   sell --payment M [--tendered A] ID[:QTY]...
//!   config [--init]               effective configuration
//! ```
//!
//! Rendering is kept in plain functions returning `String`, so output can
//! be tested without a terminal.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use till_client::TillConfig;
use till_core::report::{DashboardSummary, Window, WindowSummary};
use till_core::{Money, PaymentMethod, Product, Role, SessionUser};

use crate::checkout::{CheckoutError, CheckoutReceipt, FailedDecrement};
use crate::commands::report::SalesReport;
use crate::commands::{cart, products, report, sale};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::{ConfigState, Session};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "till", version, about = "Point-of-sale till")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "TILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Id of the signed-in user, recorded on every sale
    #[arg(long, global = true, env = "TILL_CASHIER_ID", default_value = "cashier")]
    pub cashier: String,

    /// Display name of the signed-in user
    #[arg(long, global = true, env = "TILL_USER_NAME", default_value = "")]
    pub name: String,

    /// admin, manager or cashier
    #[arg(long, global = true, env = "TILL_ROLE", default_value = "cashier")]
    pub role: Role,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the catalog
    Products {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },

    /// Products below their reorder point
    LowStock,

    /// Sales in a window
    Report {
        /// today, week, month or overall
        #[arg(long, default_value = "today")]
        window: Window,
    },

    /// Profit per window, or for a single day
    Profit {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Today's figures and weekday totals
    Dashboard,

    /// Ring up and check out a sale
    Sell {
        /// cash, mpesa or card
        #[arg(long, default_value = "cash")]
        payment: String,

        /// Cash handed over, e.g. 500 or 500.00
        #[arg(long)]
        tendered: Option<Money>,

        /// Items as PRODUCT_ID or PRODUCT_ID:QTY
        #[arg(required = true)]
        items: Vec<LineArg>,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// One `ID[:QTY]` item argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineArg {
    pub product_id: String,
    pub quantity: i64,
}

impl FromStr for LineArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.rsplit_once(':') {
            Some((id, qty)) => {
                let qty = qty
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("Invalid quantity in '{}'", s))?;
                (id, qty)
            }
            None => (s, 1),
        };

        let id = id.trim();
        if id.is_empty() {
            return Err(format!("Missing product id in '{}'", s));
        }

        Ok(LineArg {
            product_id: id.to_string(),
            quantity,
        })
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Runs one invocation against the configured backend.
pub async fn run(cli: Cli) -> ApiResult<String> {
    let config = TillConfig::load(cli.config.clone())?;

    if let Command::Config { init } = cli.command {
        if init {
            config.save(cli.config)?;
        }
        return Ok(render_config(&config));
    }

    let user = SessionUser {
        id: cli.cashier,
        name: cli.name,
        role: cli.role,
    };
    info!(user_id = %user.id, role = %user.role, "Opening session");
    let session = Session::connect(config, user)?;
    execute(&session, cli.command, Local::now()).await
}

/// Executes a command on an open session.
pub async fn execute<Tz: TimeZone>(
    session: &Session,
    command: Command,
    now: DateTime<Tz>,
) -> ApiResult<String> {
    let config = &session.config;

    match command {
        Command::Products { search } => {
            products::refresh_catalog(session).await?;
            let list = match search {
                Some(query) => products::search_products(session, &query)?,
                None => products::list_products(session),
            };
            Ok(render_products(config, &list))
        }
        Command::LowStock => {
            products::refresh_catalog(session).await?;
            Ok(render_products(config, &products::low_stock(session)))
        }
        Command::Report { window } => {
            report::refresh_sales(session).await?;
            let sales = report::sales_report(session, window, &now)?;
            Ok(render_sales_report(config, &sales))
        }
        Command::Profit { date } => {
            session.require_profit_access()?;
            report::refresh_sales(session).await?;
            match date {
                Some(date) => {
                    let profit = report::profit_for_date(session, date, &now.timezone())?;
                    Ok(format!("Profit on {}: {}\n", date, config.format_money(profit)))
                }
                None => Ok(render_profit(config, &report::profit_report(session, &now)?)),
            }
        }
        Command::Dashboard => {
            products::refresh_catalog(session).await?;
            report::refresh_sales(session).await?;
            Ok(render_dashboard(config, &report::dashboard(session, &now)?))
        }
        Command::Sell {
            payment,
            tendered,
            items,
        } => {
            products::refresh_catalog(session).await?;
            for item in &items {
                cart::add_to_cart(session, &item.product_id, Some(item.quantity))?;
            }
            cart::set_payment(session, PaymentMethod::from(payment), tendered)?;

            match sale::checkout(session, now.with_timezone(&Utc)).await {
                Ok(receipt) => Ok(render_receipt(config, &receipt)),
                Err(CheckoutError::PartialInventorySync { receipt, failed }) => {
                    warn!(count = failed.len(), "Stock needs manual reconciliation");
                    let mut message = render_receipt(config, &receipt);
                    message.push_str(&render_failed_decrements(&failed));
                    Err(ApiError::new(ErrorCode::PartialInventorySync, message))
                }
                Err(err) => Err(err.into()),
            }
        }
        Command::Config { .. } => Ok(render_config(session.config.config())),
    }
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_products(money: &ConfigState, products: &[Product]) -> String {
    if products.is_empty() {
        return "No products\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("{:<10} {:<30} {:>6} {:>14}\n", "ID", "NAME", "QTY", "PRICE"));
    for p in products {
        out.push_str(&format!(
            "{:<10} {:<30} {:>6} {:>14}\n",
            p.id,
            p.name,
            p.quantity,
            money.format_money(p.price)
        ));
    }
    out
}

pub fn render_sales_report(money: &ConfigState, report: &SalesReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}: {} sale(s), {}\n",
        report.window.label(),
        report.sales_count,
        money.format_money(report.total_sales)
    ));
    for sale in &report.sales {
        let when = sale
            .timestamp
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:<12} {:<16} {:<8} {:>14}\n",
            sale.id.as_deref().unwrap_or("-"),
            when,
            sale.payment_method,
            money.format_money(sale.total)
        ));
    }
    out
}

pub fn render_profit(money: &ConfigState, summaries: &[WindowSummary]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:>6} {:>14} {:>14}\n", "WINDOW", "SALES", "TOTAL", "PROFIT"));
    for s in summaries {
        out.push_str(&format!(
            "{:<12} {:>6} {:>14} {:>14}\n",
            s.window.label(),
            s.sales_count,
            money.format_money(s.total_sales),
            money.format_money(s.total_profit)
        ));
    }
    out
}

pub fn render_dashboard(money: &ConfigState, summary: &DashboardSummary) -> String {
    const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    let mut out = String::new();
    out.push_str(&format!("Today:     {}\n", money.format_money(summary.today_total)));
    out.push_str(&format!("Orders:    {}\n", summary.today_orders));
    out.push_str(&format!("Units:     {}\n", summary.today_units));
    out.push_str(&format!("Low stock: {}\n", summary.low_stock.len()));
    for (day, total) in DAYS.iter().zip(summary.weekday_totals.iter()) {
        out.push_str(&format!("  {} {:>14}\n", day, money.format_money(*total)));
    }
    out
}

pub fn render_receipt(money: &ConfigState, receipt: &CheckoutReceipt) -> String {
    let sale = &receipt.sale;
    let mut out = String::new();
    out.push_str(&format!("{}\n", money.store_name()));
    out.push_str(&format!("Sale {}\n", sale.id.as_deref().unwrap_or("-")));
    for item in &sale.items {
        out.push_str(&format!(
            "  {:<30} x{:<4} {:>14}\n",
            item.product_name,
            item.units(),
            money.format_money(item.line_total())
        ));
    }
    out.push_str(&format!("Total    {}\n", money.format_money(sale.total)));
    out.push_str(&format!("Paid by  {}\n", sale.payment_method));
    if let Some(change) = receipt.change_due {
        out.push_str(&format!("Change   {}\n", money.format_money(change)));
    }
    out
}

fn render_failed_decrements(failed: &[FailedDecrement]) -> String {
    let mut out = String::from("Stock NOT updated for:\n");
    for f in failed {
        out.push_str(&format!(
            "  {} ({}): should be {} ({})\n",
            f.product_name, f.product_id, f.intended_quantity, f.reason
        ));
    }
    out
}

fn render_config(config: &TillConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("api.base_url   = {}\n", config.api.base_url));
    out.push_str(&format!(
        "api.token      = {}\n",
        if config.api.token.is_some() { "<set>" } else { "<none>" }
    ));
    out.push_str(&format!("api.timeout_ms = {}\n", config.api.timeout_ms));
    out.push_str(&format!("store.name     = {}\n", config.store.name));
    out.push_str(&format!("store.currency = {}\n", config.store.currency));
    if let Some(path) = TillConfig::default_config_path() {
        out.push_str(&format!("default file   = {}\n", path.display()));
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, session_with};
    use till_client::{ClientError, MockCatalogService, MockSalesService};
    use till_core::SaleRecord;

    #[test]
    fn test_parse_line_args() {
        assert_eq!(
            "7:3".parse::<LineArg>().unwrap(),
            LineArg {
                product_id: "7".to_string(),
                quantity: 3
            }
        );
        assert_eq!("abc".parse::<LineArg>().unwrap().quantity, 1);
        assert!("7:x".parse::<LineArg>().is_err());
        assert!(":2".parse::<LineArg>().is_err());
    }

    #[test]
    fn test_parse_sell_command() {
        let cli = Cli::try_parse_from([
            "till", "--role", "manager", "sell", "--payment", "cash", "--tendered", "500", "1:2",
            "9",
        ])
        .unwrap();

        assert_eq!(cli.role, Role::Manager);
        match cli.command {
            Command::Sell {
                payment,
                tendered,
                items,
            } => {
                assert_eq!(payment, "cash");
                assert_eq!(tendered, Some(Money::from_major_minor(500, 0)));
                assert_eq!(items.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_window() {
        let cli = Cli::try_parse_from(["till", "report", "--window", "week"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Report {
                window: Window::ThisWeek
            }
        ));
        assert!(Cli::try_parse_from(["till", "report", "--window", "year"]).is_err());
        assert!(Cli::try_parse_from(["till", "sell"]).is_err());
    }

    #[tokio::test]
    async fn test_sell_prints_receipt_with_change() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_list_products()
            .returning(|| Ok(vec![product("1", 100, 60, 5)]));
        catalog
            .expect_set_quantity()
            .returning(|id, qty| Ok(product(id, 100, 60, qty)));
        let mut sales = MockSalesService::new();
        sales
            .expect_record_sale()
            .returning(|draft| Ok(SaleRecord::from_draft(Some("77".to_string()), draft.clone())));
        let session = session_with(Role::Cashier, catalog, sales);

        let out = execute(
            &session,
            Command::Sell {
                payment: "cash".to_string(),
                tendered: Some(Money::from_major_minor(250, 0)),
                items: vec!["1:2".parse().unwrap()],
            },
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(out.contains("Sale 77"));
        assert!(out.contains("Total    Ksh 200.00"));
        assert!(out.contains("Change   Ksh 50.00"));
    }

    #[tokio::test]
    async fn test_sell_with_failed_stock_update_keeps_change() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_list_products()
            .returning(|| Ok(vec![product("1", 100, 60, 5)]));
        catalog.expect_set_quantity().returning(|_, _| {
            Err(ClientError::Rejected {
                status: 409,
                message: "version conflict".to_string(),
            })
        });
        let mut sales = MockSalesService::new();
        sales
            .expect_record_sale()
            .returning(|draft| Ok(SaleRecord::from_draft(Some("78".to_string()), draft.clone())));
        let session = session_with(Role::Cashier, catalog, sales);

        let err = execute(
            &session,
            Command::Sell {
                payment: "cash".to_string(),
                tendered: Some(Money::from_major_minor(500, 0)),
                items: vec!["1:2".parse().unwrap()],
            },
            Utc::now(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::PartialInventorySync);
        assert!(err.message.contains("Sale 78"));
        assert!(err.message.contains("Change   Ksh 300.00"));
        assert!(err.message.contains("Product 1 (1): should be 3"));
        assert_eq!(session.sales.len(), 1);
    }

    #[tokio::test]
    async fn test_cashier_cannot_see_profit() {
        let mut sales = MockSalesService::new();
        sales.expect_list_sales().never();
        let session = session_with(Role::Cashier, MockCatalogService::new(), sales);

        let err = execute(&session, Command::Profit { date: None }, Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
