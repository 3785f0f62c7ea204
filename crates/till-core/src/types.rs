//! # Domain Types
//!
//! Core domain types shared by the cart, the reports and the backend
//! collaborators.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   SaleRecord    │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (server)    │   │  product_id     │       │
//! │  │  sku, category  │   │  cashier_id     │   │  product_name   │       │
//! │  │  price, cost    │   │  items[]        │   │  price (frozen) │       │
//! │  │  quantity       │   │  payment_method │   │  cost  (frozen) │       │
//! │  │  reorder_point  │   │  timestamp      │   │  quantity       │       │
//! │  └─────────────────┘   │  total          │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductFields  │   │   SaleDraft     │   │ PaymentMethod   │       │
//! │  │  (create/update)│   │  (pre-submit)   │   │ cash/mpesa/card │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleItem` freezes price and cost when the sale is rung up, so
//! historical profit does not move when the catalog is repriced.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry as returned by the backend.
///
/// The client only ever holds read-through copies; the backend owns the
/// real stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,

    pub name: String,

    /// Stock Keeping Unit.
    #[serde(default)]
    pub sku: String,

    #[serde(default)]
    pub category: String,

    /// Unit sale price.
    pub price: Money,

    /// Unit cost. Older catalog rows carry none; treated as zero.
    #[serde(default)]
    pub cost: Money,

    /// On-hand quantity.
    pub quantity: i64,

    /// Restock threshold.
    #[serde(default)]
    pub reorder_point: i64,

    /// Icon reference picked in the inventory screen (e.g. `FaCoffee`).
    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub barcode: Option<String>,
}

impl Product {
    /// Checks if the product can be added to a cart at all.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// A product is low on stock once it drops below its reorder point.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.reorder_point
    }

    /// Margin per unit at current catalog prices.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.price - self.cost
    }

    /// Returns the editable fields of this product.
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            sku: self.sku.clone(),
            category: self.category.clone(),
            price: self.price,
            cost: self.cost,
            quantity: self.quantity,
            reorder_point: self.reorder_point,
            icon: self.icon.clone(),
            barcode: self.barcode.clone(),
        }
    }
}

/// The editable fields of a product, used for create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: Money,
    pub cost: Money,
    pub quantity: i64,
    pub reorder_point: i64,
    pub icon: Option<String>,
    pub barcode: Option<String>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
///
/// Unknown strings from historical records are preserved in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Physical cash; the operator enters the amount tendered.
    #[default]
    Cash,
    /// M-PESA mobile money.
    Mpesa,
    /// Card on an external terminal.
    Card,
    Other(String),
}

impl PaymentMethod {
    /// Returns the wire name.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::Other(name) => name,
        }
    }

    /// Only cash payments have a tendered amount and change.
    #[inline]
    pub fn takes_tender(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cash" => PaymentMethod::Cash,
            "mpesa" | "m-pesa" => PaymentMethod::Mpesa,
            "card" | "credit" | "debit" => PaymentMethod::Card,
            _ => PaymentMethod::Other(value),
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        PaymentMethod::from(value.to_string())
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale, frozen at checkout.
///
/// Drafts built from a cart always populate `price`, `product_cost` and
/// `quantity`. Records read back from the backend may be missing any of
/// them (rows written before cost capture); such items still count toward
/// item listings but contribute nothing to profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    #[serde(deserialize_with = "wire::id")]
    pub product_id: String,

    #[serde(default)]
    pub product_name: String,

    /// Unit price at time of sale.
    #[serde(default)]
    pub price: Option<Money>,

    /// Unit cost at time of sale.
    #[serde(default)]
    pub product_cost: Option<Money>,

    #[serde(default)]
    pub quantity: Option<i64>,
}

impl SaleItem {
    /// Profit on this line: `(price - cost) * quantity`, or zero if any of
    /// the three is missing.
    pub fn profit(&self) -> Money {
        match (self.price, self.product_cost, self.quantity) {
            (Some(price), Some(cost), Some(quantity)) => (price - cost) * quantity,
            _ => Money::zero(),
        }
    }

    /// Revenue on this line, or zero if price or quantity is missing.
    pub fn line_total(&self) -> Money {
        match (self.price, self.quantity) {
            (Some(price), Some(quantity)) => price * quantity,
            _ => Money::zero(),
        }
    }

    /// Units sold on this line (zero if unknown).
    #[inline]
    pub fn units(&self) -> i64 {
        self.quantity.unwrap_or(0)
    }
}

// =============================================================================
// Sale Draft / Sale Record
// =============================================================================

/// A sale assembled from the cart, not yet submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDraft {
    pub cashier_id: String,
    pub items: Vec<SaleItem>,
    pub payment_method: PaymentMethod,
    pub timestamp: DateTime<Utc>,
    pub total: Money,
}

/// A completed sale as stored by the backend.
///
/// Immutable once created. `id` is assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(default, deserialize_with = "wire::optional_id")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "wire::optional_id")]
    pub cashier_id: Option<String>,

    #[serde(default)]
    pub items: Vec<SaleItem>,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    /// `None` when the backend row has no parseable timestamp; such sales
    /// only appear in the overall window.
    #[serde(default, deserialize_with = "wire::lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub total: Money,
}

impl SaleRecord {
    /// Profit across all items of this sale.
    pub fn profit(&self) -> Money {
        self.items.iter().map(SaleItem::profit).sum()
    }

    /// Units sold across all items.
    pub fn units(&self) -> i64 {
        self.items.iter().map(SaleItem::units).sum()
    }

    /// Builds the record the backend would return for `draft`.
    pub fn from_draft(id: Option<String>, draft: SaleDraft) -> Self {
        SaleRecord {
            id,
            cashier_id: Some(draft.cashier_id),
            items: draft.items,
            payment_method: draft.payment_method,
            timestamp: Some(draft.timestamp),
            total: draft.total,
        }
    }
}

// =============================================================================
// Roles
// =============================================================================

/// Role of the signed-in user. Gates affordances only; no business rule
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

impl Role {
    /// Create, edit and delete catalog entries.
    #[inline]
    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// See cost and profit figures.
    #[inline]
    pub fn can_view_profit(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Cashier => write!(f, "cashier"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            other => Err(format!(
                "Unknown role: '{}'. Valid options: admin, manager, cashier",
                other
            )),
        }
    }
}

/// The user the session was opened for, as supplied by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
}

// =============================================================================
// Wire Helpers
// =============================================================================

/// Deserializers tolerant of the backend's loose JSON.
mod wire {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Text(s) => s,
                RawId::Int(n) => n.to_string(),
                RawId::Uint(n) => n.to_string(),
            }
        }
    }

    /// Accepts `"42"` or `42`.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        RawId::deserialize(deserializer).map(String::from)
    }

    pub fn optional_id<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
    }

    /// RFC 3339 first, then a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC.
    /// Anything else becomes `None` instead of failing the whole listing.
    pub fn lenient_timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }

    pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(price: Option<i64>, cost: Option<i64>, qty: Option<i64>) -> SaleItem {
        SaleItem {
            product_id: "p1".to_string(),
            product_name: "Coffee".to_string(),
            price: price.map(Money::from_cents),
            product_cost: cost.map(Money::from_cents),
            quantity: qty,
        }
    }

    #[test]
    fn test_sale_item_profit() {
        assert_eq!(item(Some(10000), Some(6000), Some(2)).profit().cents(), 8000);
    }

    #[test]
    fn test_sale_item_missing_fields_contribute_zero() {
        assert!(item(None, Some(6000), Some(2)).profit().is_zero());
        assert!(item(Some(10000), None, Some(2)).profit().is_zero());
        assert!(item(Some(10000), Some(6000), None).profit().is_zero());
    }

    #[test]
    fn test_sale_item_below_cost_is_negative_profit() {
        assert_eq!(item(Some(500), Some(700), Some(3)).profit().cents(), -600);
    }

    #[test]
    fn test_product_deserializes_numeric_id_and_defaults() {
        let json = r#"{"id": 7, "name": "Tea", "price": 50, "quantity": 3}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, "7");
        assert_eq!(product.price.cents(), 5000);
        assert!(product.cost.is_zero());
        assert_eq!(product.reorder_point, 0);
        assert!(product.icon.is_none());
    }

    #[test]
    fn test_low_stock() {
        let json = r#"{"id": "a", "name": "Tea", "price": 50, "quantity": 3, "reorder_point": 5}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_sale_record_lenient_shapes() {
        let json = r#"{
            "id": 12,
            "cashier_id": 1,
            "items": [{"product_id": 3, "product_name": "Tea", "price": 50, "quantity": 2}],
            "payment_method": "mpesa",
            "timestamp": "not a date",
            "total": 100
        }"#;
        let record: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("12"));
        assert_eq!(record.cashier_id.as_deref(), Some("1"));
        assert_eq!(record.payment_method, PaymentMethod::Mpesa);
        assert!(record.timestamp.is_none());
        assert!(record.items[0].product_cost.is_none());
        assert!(record.profit().is_zero());
        assert_eq!(record.total.cents(), 10000);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 10, 1, 8, 30, 0).unwrap();
        assert_eq!(wire::parse_timestamp("2024-10-01T08:30:00Z"), Some(expected));
        assert_eq!(wire::parse_timestamp("2024-10-01T11:30:00+03:00"), Some(expected));
        assert_eq!(wire::parse_timestamp("2024-10-01T08:30:00"), Some(expected));
        assert_eq!(wire::parse_timestamp("2024-10-01 08:30:00"), Some(expected));
        assert_eq!(wire::parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(PaymentMethod::from("MPESA"), PaymentMethod::Mpesa);
        assert_eq!(PaymentMethod::from("cash"), PaymentMethod::Cash);
        assert_eq!(
            PaymentMethod::from("voucher"),
            PaymentMethod::Other("voucher".to_string())
        );
        let json = serde_json::to_string(&PaymentMethod::Mpesa).unwrap();
        assert_eq!(json, "\"mpesa\"");
    }

    #[test]
    fn test_role_gating() {
        assert!(Role::Admin.can_manage_inventory());
        assert!(Role::Manager.can_view_profit());
        assert!(!Role::Cashier.can_manage_inventory());
        assert!(!Role::Cashier.can_view_profit());
        assert_eq!("Cashier".parse::<Role>().unwrap(), Role::Cashier);
        assert!("owner".parse::<Role>().is_err());
    }
}
