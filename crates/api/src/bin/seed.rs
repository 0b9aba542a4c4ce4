//! Load a few sample products into the configured store.

use anyhow::bail;

use farmstand_api::{
    app::services::build_store,
    config::{Settings, StoreBackend},
};
use farmstand_infra::ProductStore;
use farmstand_products::{Category, NewProduct};

fn samples() -> Vec<NewProduct> {
    vec![
        NewProduct::new("Fairy Eggplant", 1.00, Category::Vegetable),
        NewProduct::new("Organic Goddess Melon", 4.99, Category::Fruit),
        NewProduct::new("Organic Mini Seedless Watermelon", 3.99, Category::Fruit),
        NewProduct::new("Organic Celery", 1.50, Category::Vegetable),
        NewProduct::new("Chocolate Whole Milk", 2.69, Category::Dairy),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    farmstand_observability::init();

    let settings = Settings::from_env()?;
    if settings.store == StoreBackend::InMemory {
        bail!("seeding the in-memory store has no effect; set FARMSTAND_STORE=postgres");
    }

    let store = build_store(&settings).await?;
    for fields in samples() {
        let product = store.create(fields).await?;
        tracing::info!(product_id = %product.id(), name = product.name(), "seeded product");
    }

    store.close().await;
    Ok(())
}
