use std::collections::BTreeMap;
use std::sync::RwLock;

use farmstand_core::ProductId;
use farmstand_products::{Category, NewProduct, Product, ProductPatch};

use super::{ProductStore, StoreError};

/// In-memory product store for tests/dev.
///
/// Keyed by `ProductId`; since ids are UUIDv7 the map iterates in creation order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self, category: Option<Category>) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .filter(|p| category.is_none_or(|c| p.category() == c))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let product = Product::new(ProductId::new(), fields)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(product.id(), product.clone());
        Ok(product)
    }

    async fn update_by_id(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let Some(current) = map.get_mut(id) else {
            return Ok(None);
        };
        let updated = current.patched(&patch)?;
        *current = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.read().map(|_| ()).map_err(|_| poisoned())
    }
}
