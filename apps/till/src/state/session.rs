//! # Session
//!
//! One operator's working context: who is signed in, the active cart, the
//! catalog and sales snapshots, and the collaborators that reach the
//! backend.
//!
//! ## Lifecycle
//! ```text
//! TillConfig + SessionUser
//!          │
//!          ▼
//! Session::connect() ── builds Backend ──► HttpCatalogService
//!          │                          └──► HttpSalesService
//!          ▼
//! commands::products::refresh_catalog()   (fill catalog snapshot)
//!          │
//!          ▼
//! add_to_cart ... checkout ... start_new_sale   (repeat)
//! ```
//!
//! Tests use [`Session::new`] with mock collaborators instead.

use std::sync::Arc;

use till_client::{
    Backend, CatalogService, ClientResult, HttpCatalogService, HttpSalesService, SalesService,
    TillConfig,
};
use till_core::SessionUser;

use super::{CartState, CatalogState, ConfigState, SalesHistory};
use crate::checkout::CheckoutCoordinator;
use crate::error::ApiError;

pub struct Session {
    pub config: ConfigState,
    pub user: SessionUser,
    pub cart: CartState,
    pub catalog: CatalogState,
    pub sales: SalesHistory,
    pub checkout: CheckoutCoordinator,
    catalog_service: Arc<dyn CatalogService>,
    sales_service: Arc<dyn SalesService>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("store", &self.config.store_name())
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session over the given collaborators.
    pub fn new(
        config: TillConfig,
        user: SessionUser,
        catalog_service: Arc<dyn CatalogService>,
        sales_service: Arc<dyn SalesService>,
    ) -> Self {
        let config = ConfigState::new(config);
        let checkout = CheckoutCoordinator::new(
            Arc::clone(&catalog_service),
            Arc::clone(&sales_service),
            config.request_timeout(),
        );

        Session {
            config,
            user,
            cart: CartState::new(),
            catalog: CatalogState::new(),
            sales: SalesHistory::new(),
            checkout,
            catalog_service,
            sales_service,
        }
    }

    /// Creates a session talking HTTP to the configured backend.
    pub fn connect(config: TillConfig, user: SessionUser) -> ClientResult<Self> {
        let backend = Backend::new(&config)?;
        let catalog = Arc::new(HttpCatalogService::new(backend.clone()));
        let sales = Arc::new(HttpSalesService::new(backend));
        Ok(Session::new(config, user, catalog, sales))
    }

    pub fn catalog_service(&self) -> &dyn CatalogService {
        self.catalog_service.as_ref()
    }

    pub fn sales_service(&self) -> &dyn SalesService {
        self.sales_service.as_ref()
    }

    /// Fails with `FORBIDDEN` unless the user may edit the catalog.
    pub fn require_inventory_access(&self) -> Result<(), ApiError> {
        if self.user.role.can_manage_inventory() {
            Ok(())
        } else {
            Err(ApiError::forbidden(self.user.role, "manage inventory"))
        }
    }

    /// Fails with `FORBIDDEN` unless the user may see cost and profit.
    pub fn require_profit_access(&self) -> Result<(), ApiError> {
        if self.user.role.can_view_profit() {
            Ok(())
        } else {
            Err(ApiError::forbidden(self.user.role, "view profit"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_client::{MockCatalogService, MockSalesService};
    use till_core::Role;

    fn session(role: Role) -> Session {
        Session::new(
            TillConfig::default(),
            SessionUser {
                id: "u1".to_string(),
                name: "Wanjiru".to_string(),
                role,
            },
            Arc::new(MockCatalogService::new()),
            Arc::new(MockSalesService::new()),
        )
    }

    #[test]
    fn test_role_gates() {
        assert!(session(Role::Admin).require_inventory_access().is_ok());
        assert!(session(Role::Manager).require_profit_access().is_ok());
        assert!(session(Role::Cashier).require_inventory_access().is_err());
        assert!(session(Role::Cashier).require_profit_access().is_err());
    }

    #[test]
    fn test_connect_uses_configured_backend() {
        let user = SessionUser {
            id: "u1".to_string(),
            name: String::new(),
            role: Role::Cashier,
        };
        assert!(Session::connect(TillConfig::default(), user.clone()).is_ok());

        let mut config = TillConfig::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(Session::connect(config, user).is_err());
    }
}
