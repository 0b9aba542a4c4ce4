//! Product store abstraction and its implementations.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use thiserror::Error;

use farmstand_core::{DomainError, ProductId};
use farmstand_products::{Category, NewProduct, Product, ProductPatch};

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;

/// Store-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected by domain rules (validation, malformed id).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing database could not be reached.
    #[error("store unavailable: {0}")]
    Connectivity(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Persistent collection of products.
///
/// Each operation is atomic on its own; there is no cross-operation
/// transaction and concurrent updates to one product are last-write-wins.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// All products (optionally restricted to one category), in creation order.
    async fn list(&self, category: Option<Category>) -> Result<Vec<Product>, StoreError>;

    async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Validate and persist a new product under a freshly generated identifier.
    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError>;

    /// Merge `patch` into the stored product and validate the merged result.
    ///
    /// Returns `Ok(None)` when no product has this identifier.
    async fn update_by_id(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Remove the product. Absent identifiers are a no-op; returns whether a record was removed.
    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, StoreError>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) {}
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn list(&self, category: Option<Category>) -> Result<Vec<Product>, StoreError> {
        (**self).list(category).await
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError> {
        (**self).create(fields).await
    }

    async fn update_by_id(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        (**self).update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, StoreError> {
        (**self).delete_by_id(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
