//! # Catalog Snapshot
//!
//! The session's last-fetched copy of the product catalog.
//!
//! The backend owns the real stock levels. This snapshot is refreshed by an
//! explicit fetch and patched locally after each sale, so it can be stale
//! between a fetch and a checkout; the cart and the checkout both read it
//! as the best known quantity.

use std::sync::{Mutex, PoisonError};
use till_core::Product;

#[derive(Debug, Default)]
pub struct CatalogState {
    products: Mutex<Vec<Product>>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the snapshot.
    pub fn with_products<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Product]) -> R,
    {
        let products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        f(&products)
    }

    fn with_products_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<Product>) -> R,
    {
        let mut products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut products)
    }

    /// Replaces the whole snapshot with a fresh fetch.
    pub fn replace(&self, products: Vec<Product>) {
        self.with_products_mut(|current| *current = products);
    }

    /// Returns a copy of the snapshot.
    pub fn snapshot(&self) -> Vec<Product> {
        self.with_products(<[Product]>::to_vec)
    }

    pub fn find(&self, product_id: &str) -> Option<Product> {
        self.with_products(|products| products.iter().find(|p| p.id == product_id).cloned())
    }

    /// Inserts a product, or replaces the entry with the same id.
    pub fn upsert(&self, product: Product) {
        self.with_products_mut(|products| {
            match products.iter_mut().find(|p| p.id == product.id) {
                Some(existing) => *existing = product,
                None => products.push(product),
            }
        });
    }

    /// Drops a product from the snapshot. Returns whether it was present.
    pub fn remove(&self, product_id: &str) -> bool {
        self.with_products_mut(|products| {
            let before = products.len();
            products.retain(|p| p.id != product_id);
            products.len() != before
        })
    }

    /// Records a reconciled stock level.
    ///
    /// A product whose quantity reaches zero or below leaves the snapshot,
    /// so it can no longer be rung up until the next fetch says otherwise.
    pub fn apply_quantity(&self, product_id: &str, quantity: i64) {
        self.with_products_mut(|products| {
            if quantity <= 0 {
                products.retain(|p| p.id != product_id);
            } else if let Some(product) = products.iter_mut().find(|p| p.id == product_id) {
                product.quantity = quantity;
            }
        });
    }
}
