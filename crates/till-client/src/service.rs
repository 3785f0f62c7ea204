//! # Collaborator Traits
//!
//! The two backend collaborators the checkout and the reports depend on.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Collaborators                                   │
//! │                                                                         │
//! │  CatalogService                       SalesService                      │
//! │  ──────────────                       ────────────                      │
//! │  list_products()   GET    /products   list_sales()   GET  /sales        │
//! │  create_product()  POST   /products   record_sale()  POST /sales        │
//! │  update_product()  PUT    /products/{id}                                │
//! │  set_quantity()    PUT    /products/{id}                                │
//! │  remove_product()  DELETE /products/{id}                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both traits are object safe and automocked (`MockCatalogService`,
//! `MockSalesService`).

use async_trait::async_trait;
use mockall::automock;
use till_core::{Product, ProductFields, SaleDraft, SaleRecord};

use crate::error::ClientResult;

/// The product catalog. The backend owns the true stock quantities; every
/// value returned here is a read-through copy.
#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieves every product.
    async fn list_products(&self) -> ClientResult<Vec<Product>>;

    /// Overwrites the on-hand quantity of a product, returning the updated
    /// product.
    async fn set_quantity(&self, product_id: &str, quantity: i64) -> ClientResult<Product>;

    /// Deletes a product.
    async fn remove_product(&self, product_id: &str) -> ClientResult<()>;

    /// Creates a product from its editable fields.
    async fn create_product(&self, fields: &ProductFields) -> ClientResult<Product>;

    /// Replaces the editable fields of a product.
    async fn update_product(&self, product_id: &str, fields: &ProductFields)
        -> ClientResult<Product>;
}

/// Sale history. Records are immutable once created.
#[automock]
#[async_trait]
pub trait SalesService: Send + Sync {
    /// Retrieves every recorded sale.
    async fn list_sales(&self) -> ClientResult<Vec<SaleRecord>>;

    /// Persists a draft, returning the stored record with its server id.
    async fn record_sale(&self, draft: &SaleDraft) -> ClientResult<SaleRecord>;
}
