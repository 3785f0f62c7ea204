//! Shared fixtures for the in-crate tests.

use std::sync::Arc;

use till_client::{MockCatalogService, MockSalesService, TillConfig};
use till_core::{Money, Product, Role, SessionUser};

use crate::state::Session;

pub fn product(id: &str, price: i64, cost: i64, quantity: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        sku: format!("SKU-{}", id),
        category: "General".to_string(),
        price: Money::from_major_minor(price, 0),
        cost: Money::from_major_minor(cost, 0),
        quantity,
        reorder_point: 0,
        icon: None,
        barcode: None,
    }
}

pub fn user(role: Role) -> SessionUser {
    SessionUser {
        id: "cashier-1".to_string(),
        name: "Wanjiru".to_string(),
        role,
    }
}

/// A session whose collaborators must not be called.
pub fn session(role: Role) -> Session {
    session_with(role, MockCatalogService::new(), MockSalesService::new())
}

pub fn session_with(role: Role, catalog: MockCatalogService, sales: MockSalesService) -> Session {
    Session::new(TillConfig::default(), user(role), Arc::new(catalog), Arc::new(sales))
}
