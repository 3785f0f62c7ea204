//! # HTTP Collaborators
//!
//! `reqwest` implementations of [`CatalogService`] and [`SalesService`]
//! against the backend's REST resources.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Flow                                    │
//! │                                                                         │
//! │  endpoint(["products", id])                                             │
//! │       │   base_url + percent-encoded segments                           │
//! │       ▼                                                                 │
//! │  request(method, url)                                                   │
//! │       │   Authorization: Bearer <token> (when configured)               │
//! │       ▼                                                                 │
//! │  tokio::time::timeout(config.timeout)  ──► ClientError::Timeout         │
//! │       │                                                                 │
//! │       ├── connect failure ─────────────► ClientError::Unavailable       │
//! │       ├── non-2xx ─────────────────────► ClientError::Rejected          │
//! │       └── 2xx, body decoded ───────────► Ok(T)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No call is retried here. A sale that was recorded but whose response was
//! lost must not be submitted twice, so retry policy belongs to the operator.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use till_core::{Product, ProductFields, SaleDraft, SaleRecord};
use tracing::debug;
use url::Url;

use crate::config::TillConfig;
use crate::error::{ClientError, ClientResult};
use crate::service::{CatalogService, SalesService};

// =============================================================================
// Backend Connection
// =============================================================================

/// Shared HTTP connection to the backend.
///
/// Cheap to clone; both collaborators can share one connection pool.
#[derive(Debug, Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

#[derive(Debug)]
struct BackendInner {
    http: Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl Backend {
    /// Builds a connection from a validated configuration.
    pub fn new(config: &TillConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Backend {
            inner: Arc::new(BackendInner {
                http,
                base_url: config.base_url()?,
                token: config.api.token.clone(),
                timeout: config.timeout(),
            }),
        })
    }

    /// Resolves path segments against the base URL, percent-encoding each
    /// segment.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", self.inner.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and decodes a JSON body.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        self.bounded(async {
            let response = Self::check(builder.send().await?).await?;
            Ok::<T, ClientError>(response.json::<T>().await?)
        })
        .await
    }

    /// Sends a request whose response body is ignored.
    async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        self.bounded(async {
            Self::check(builder.send().await?).await?;
            Ok::<(), ClientError>(())
        })
        .await
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = ClientResult<T>>,
    ) -> ClientResult<T> {
        tokio::time::timeout(self.inner.timeout, call)
            .await
            .map_err(|_| ClientError::Timeout(self.inner.timeout))?
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The products resource.
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    backend: Backend,
}

impl HttpCatalogService {
    pub fn new(backend: Backend) -> Self {
        HttpCatalogService { backend }
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let url = self.backend.endpoint(&["products"])?;
        debug!(%url, "GET products");
        self.backend
            .send_json(self.backend.request(Method::GET, url))
            .await
    }

    async fn set_quantity(&self, product_id: &str, quantity: i64) -> ClientResult<Product> {
        let url = self.backend.endpoint(&["products", product_id])?;
        debug!(%url, quantity, "PUT product quantity");
        let body = serde_json::json!({ "quantity": quantity });
        self.backend
            .send_json(self.backend.request(Method::PUT, url).json(&body))
            .await
    }

    async fn remove_product(&self, product_id: &str) -> ClientResult<()> {
        let url = self.backend.endpoint(&["products", product_id])?;
        debug!(%url, "DELETE product");
        self.backend
            .send_empty(self.backend.request(Method::DELETE, url))
            .await
    }

    async fn create_product(&self, fields: &ProductFields) -> ClientResult<Product> {
        let url = self.backend.endpoint(&["products"])?;
        debug!(%url, sku = %fields.sku, "POST product");
        self.backend
            .send_json(self.backend.request(Method::POST, url).json(fields))
            .await
    }

    async fn update_product(
        &self,
        product_id: &str,
        fields: &ProductFields,
    ) -> ClientResult<Product> {
        let url = self.backend.endpoint(&["products", product_id])?;
        debug!(%url, sku = %fields.sku, "PUT product");
        self.backend
            .send_json(self.backend.request(Method::PUT, url).json(fields))
            .await
    }
}

// =============================================================================
// Sales
// =============================================================================

/// The sales resource.
#[derive(Debug, Clone)]
pub struct HttpSalesService {
    backend: Backend,
}

impl HttpSalesService {
    pub fn new(backend: Backend) -> Self {
        HttpSalesService { backend }
    }
}

#[async_trait]
impl SalesService for HttpSalesService {
    async fn list_sales(&self) -> ClientResult<Vec<SaleRecord>> {
        let url = self.backend.endpoint(&["sales"])?;
        debug!(%url, "GET sales");
        self.backend
            .send_json(self.backend.request(Method::GET, url))
            .await
    }

    async fn record_sale(&self, draft: &SaleDraft) -> ClientResult<SaleRecord> {
        let url = self.backend.endpoint(&["sales"])?;
        debug!(%url, lines = draft.items.len(), total = %draft.total, "POST sale");
        self.backend
            .send_json(self.backend.request(Method::POST, url).json(draft))
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================
