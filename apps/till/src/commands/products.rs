//! # Product Commands
//!
//! Catalog fetch, search and maintenance.
//!
//! ## Snapshot vs Backend
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  refresh_catalog ──► CatalogService::list_products ──► snapshot.replace │
//! │                                                                         │
//! │  list / search / low_stock ──────────────────────────► snapshot (read)  │
//! │                                                                         │
//! │  create / update ──► validate ──► CatalogService ────► snapshot.upsert  │
//! │  delete ────────────────────────► CatalogService ────► snapshot.remove  │
//! │                                                                         │
//! │  (create, update, delete: admin and manager only)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use till_core::report;
use till_core::validation::{validate_product_fields, validate_search_query};
use till_core::{Product, ProductFields};

use crate::error::ApiResult;
use crate::state::Session;

/// Fetches the catalog and replaces the session snapshot.
pub async fn refresh_catalog(session: &Session) -> ApiResult<Vec<Product>> {
    debug!("refresh_catalog command");

    let products = session.catalog_service().list_products().await?;
    info!(count = products.len(), "Catalog refreshed");
    session.catalog.replace(products.clone());
    Ok(products)
}

/// Returns the catalog snapshot.
pub fn list_products(session: &Session) -> Vec<Product> {
    debug!("list_products command");
    session.catalog.snapshot()
}

/// Case-insensitive name search over the snapshot.
///
/// ## Arguments
/// * `query` - Search term; empty matches every product
pub fn search_products(session: &Session, query: &str) -> ApiResult<Vec<Product>> {
    debug!(query = %query, "search_products command");

    let needle = validate_search_query(query)?.to_lowercase();
    Ok(session.catalog.with_products(|products| {
        products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }))
}

/// Products below their reorder point.
pub fn low_stock(session: &Session) -> Vec<Product> {
    debug!("low_stock command");
    session.catalog.with_products(report::low_stock)
}

/// Creates a product.
pub async fn create_product(session: &Session, fields: ProductFields) -> ApiResult<Product> {
    debug!(name = %fields.name, sku = %fields.sku, "create_product command");
    session.require_inventory_access()?;
    validate_product_fields(&fields)?;

    let product = session.catalog_service().create_product(&fields).await?;
    info!(product_id = %product.id, "Product created");
    session.catalog.upsert(product.clone());
    Ok(product)
}

/// Replaces the editable fields of a product.
pub async fn update_product(
    session: &Session,
    product_id: &str,
    fields: ProductFields,
) -> ApiResult<Product> {
    debug!(product_id = %product_id, "update_product command");
    session.require_inventory_access()?;
    validate_product_fields(&fields)?;

    let product = session
        .catalog_service()
        .update_product(product_id, &fields)
        .await?;
    session.catalog.upsert(product.clone());
    Ok(product)
}

/// Deletes a product.
pub async fn delete_product(session: &Session, product_id: &str) -> ApiResult<()> {
    debug!(product_id = %product_id, "delete_product command");
    session.require_inventory_access()?;

    session.catalog_service().remove_product(product_id).await?;
    session.catalog.remove(product_id);
    info!(product_id = %product_id, "Product deleted");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{product, session, session_with};
    use till_client::{ClientError, MockCatalogService, MockSalesService};
    use till_core::Role;

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_list_products()
            .times(1)
            .returning(|| Ok(vec![product("1", 10, 5, 3), product("2", 20, 5, 0)]));
        let session = session_with(Role::Cashier, catalog, MockSalesService::new());
        session.catalog.replace(vec![product("9", 1, 1, 1)]);

        let products = refresh_catalog(&session).await.unwrap();

        assert_eq!(products.len(), 2);
        assert!(session.catalog.find("9").is_none());
        assert!(session.catalog.find("2").is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_snapshot() {
        let mut catalog = MockCatalogService::new();
        catalog
            .expect_list_products()
            .returning(|| Err(ClientError::Unavailable("refused".to_string())));
        let session = session_with(Role::Cashier, catalog, MockSalesService::new());
        session.catalog.replace(vec![product("9", 1, 1, 1)]);

        let err = refresh_catalog(&session).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::CollaboratorUnavailable);
        assert_eq!(list_products(&session).len(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let session = session(Role::Cashier);
        let mut tea = product("1", 10, 5, 3);
        tea.name = "Green Tea".to_string();
        let mut coffee = product("2", 10, 5, 3);
        coffee.name = "Coffee".to_string();
        session.catalog.replace(vec![tea, coffee]);

        let found = search_products(&session, "  TEA ").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");

        assert_eq!(search_products(&session, "").unwrap().len(), 2);
        assert_eq!(
            search_products(&session, &"x".repeat(101)).unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_low_stock() {
        let session = session(Role::Cashier);
        let mut low = product("1", 10, 5, 2);
        low.reorder_point = 5;
        session.catalog.replace(vec![low, product("2", 10, 5, 50)]);

        let products = low_stock(&session);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "1");
    }

    #[tokio::test]
    async fn test_cashier_cannot_edit_catalog() {
        let mut catalog = MockCatalogService::new();
        catalog.expect_create_product().never();
        catalog.expect_remove_product().never();
        let session = session_with(Role::Cashier, catalog, MockSalesService::new());

        let err = create_product(&session, product("1", 10, 5, 1).fields())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        let err = delete_product(&session, "1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_invalid_fields_never_reach_backend() {
        let mut catalog = MockCatalogService::new();
        catalog.expect_update_product().never();
        let session = session_with(Role::Manager, catalog, MockSalesService::new());
        let mut fields = product("1", 10, 5, 1).fields();
        fields.name = "   ".to_string();

        let err = update_product(&session, "1", fields).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_manager_edits_update_snapshot() {
        let mut catalog = MockCatalogService::new();
        catalog.expect_create_product().times(1).returning(|fields| {
            let mut created = product("7", 0, 0, 0);
            created.name = fields.name.clone();
            created.quantity = fields.quantity;
            Ok(created)
        });
        catalog
            .expect_remove_product()
            .withf(|id| id == "7")
            .times(1)
            .returning(|_| Ok(()));
        let session = session_with(Role::Manager, catalog, MockSalesService::new());

        let mut fields = product("x", 10, 5, 12).fields();
        fields.name = "Sugar 1kg".to_string();
        let created = create_product(&session, fields).await.unwrap();
        assert_eq!(session.catalog.find("7"), Some(created));

        delete_product(&session, "7").await.unwrap();
        assert!(session.catalog.find("7").is_none());
    }
}
