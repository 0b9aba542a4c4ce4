//! Long-lived process services: the product store handle and the view renderer.
//!
//! Constructed once at startup, shared by every request through an `Extension`,
//! and shut down explicitly after the server stops.

use std::sync::Arc;

use farmstand_infra::{InMemoryProductStore, PostgresProductStore, ProductStore};

use crate::app::views::Views;
use crate::config::{Settings, StoreBackend};

pub struct AppServices {
    store: Arc<dyn ProductStore>,
    views: Views,
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>, views: Views) -> Self {
        Self { store, views }
    }

    /// In-process store (dev/test).
    pub fn in_memory() -> Result<Self, minijinja::Error> {
        Ok(Self::new(Arc::new(InMemoryProductStore::new()), Views::new()?))
    }

    pub fn store(&self) -> &dyn ProductStore {
        self.store.as_ref()
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    /// Release the store connection.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

/// Open the store selected by `settings`.
pub async fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn ProductStore>> {
    match settings.store {
        StoreBackend::InMemory => {
            tracing::warn!("using in-memory product store; data is lost on exit");
            Ok(Arc::new(InMemoryProductStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PostgresProductStore::connect(&settings.database_url).await?;
            store.init_schema().await?;
            tracing::info!("postgres connection open");
            Ok(Arc::new(store))
        }
    }
}

/// Wire every service the router needs.
pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    let store = build_store(settings).await?;
    let views = Views::new()?;
    Ok(AppServices::new(store, views))
}
