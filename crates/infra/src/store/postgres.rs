//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (check constraint violation) | `23514` | `Domain(Validation)` |
//! | Database (not-null violation) | `23502` | `Domain(Validation)` |
//! | Database (other) | Any other | `Backend` |
//! | Io / Tls / PoolTimedOut / PoolClosed / WorkerCrashed | N/A | `Connectivity` |
//! | Other | N/A | `Backend` |

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use farmstand_core::{DomainError, ProductId};
use farmstand_products::{Category, NewProduct, Product, ProductPatch};

use super::{ProductStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL CHECK (length(btrim(name)) > 0),
    price       DOUBLE PRECISION NOT NULL CHECK (price >= 0),
    category    TEXT NOT NULL CHECK (category IN ('fruit', 'vegetable', 'dairy')),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Postgres-backed product store.
///
/// The pool is opened once at startup and shared by every request; `close()`
/// drains it at shutdown. The table constraints mirror the domain rules, so rows
/// written by other clients are held to the same invariants.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("init_schema", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), err)]
    async fn list(&self, category: Option<Category>) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price, category
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(category.map(Category::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, price, category FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_by_id", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, fields), err)]
    async fn create(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let product = Product::new(ProductId::new(), fields)?;

        sqlx::query("INSERT INTO products (id, name, price, category) VALUES ($1, $2, $3, $4)")
            .bind(product.id().as_uuid())
            .bind(product.name())
            .bind(product.price())
            .bind(product.category().as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create", e))?;

        Ok(product)
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update_by_id(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_by_id", e))?;

        let row = sqlx::query(
            "SELECT id, name, price, category FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_by_id", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let updated = product_from_row(&row)?.patched(&patch)?;

        sqlx::query("UPDATE products SET name = $2, price = $3, category = $4 WHERE id = $1")
            .bind(updated.id().as_uuid())
            .bind(updated.name())
            .bind(updated.price())
            .bind(updated.category().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_by_id", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_by_id", e))?;

        Ok(Some(updated))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_by_id(&self, id: &ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("postgres pool closed");
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Backend(format!("failed to decode product row: {e}"));

    let id: uuid::Uuid = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let price: f64 = row.try_get("price").map_err(decode)?;
    let category: String = row.try_get("category").map_err(decode)?;

    let corrupt = |e: DomainError| StoreError::Backend(format!("corrupt product row {id}: {e}"));
    let category: Category = category.parse().map_err(corrupt)?;
    Product::new(ProductId::from_uuid(id), NewProduct::new(name, price, category)).map_err(corrupt)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23514") | Some("23502") => {
                    StoreError::Domain(DomainError::validation(msg))
                }
                _ => StoreError::Backend(format!("database error in {operation}: {msg}")),
            }
        }
        sqlx::Error::Io(e) => {
            StoreError::Connectivity(format!("i/o error in {operation}: {e}"))
        }
        sqlx::Error::Tls(e) => {
            StoreError::Connectivity(format!("tls error in {operation}: {e}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Connectivity(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Connectivity(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::WorkerCrashed => {
            StoreError::Connectivity(format!("connection worker crashed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a reachable database; run with
    //! `DATABASE_URL=postgres://... cargo test -- --ignored`.

    use super::*;

    async fn store() -> PostgresProductStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresProductStore::connect(&url).await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    #[test]
    fn pool_errors_map_to_connectivity() {
        assert!(matches!(
            map_sqlx_error("list", sqlx::Error::PoolTimedOut),
            StoreError::Connectivity(_)
        ));
        assert!(matches!(
            map_sqlx_error("list", sqlx::Error::PoolClosed),
            StoreError::Connectivity(_)
        ));
    }

    #[test]
    fn row_not_found_maps_to_backend() {
        assert!(matches!(
            map_sqlx_error("get_by_id", sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn invalid_text_representation_is_a_backend_error() {
        let store = store().await;
        let err = sqlx::query("SELECT 'not-a-uuid'::uuid")
            .execute(store.pool())
            .await
            .unwrap_err();

        assert!(matches!(
            map_sqlx_error("select", err),
            StoreError::Backend(_)
        ));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn crud_round_trip() {
        let store = store().await;

        let created = store
            .create(NewProduct::new("Apples", 1.50, Category::Fruit))
            .await
            .unwrap();
        let fetched = store.get_by_id(&created.id()).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let patch = ProductPatch {
            price: Some(2.75),
            ..ProductPatch::default()
        };
        let updated = store.update_by_id(&created.id(), patch).await.unwrap().unwrap();
        assert_eq!(updated.price(), 2.75);
        assert_eq!(updated.name(), "Apples");

        let fruit = store.list(Some(Category::Fruit)).await.unwrap();
        assert!(fruit.iter().any(|p| p.id() == created.id()));
        assert!(fruit.iter().all(|p| p.category() == Category::Fruit));

        assert!(store.delete_by_id(&created.id()).await.unwrap());
        assert!(store.get_by_id(&created.id()).await.unwrap().is_none());
        assert!(!store.delete_by_id(&created.id()).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn check_constraints_reject_rows_written_around_the_domain() {
        let store = store().await;

        let err = sqlx::query("INSERT INTO products (id, name, price, category) VALUES ($1, 'Steak', 9.0, 'meat')")
            .bind(ProductId::new().as_uuid())
            .execute(store.pool())
            .await
            .map_err(|e| map_sqlx_error("insert", e))
            .unwrap_err();

        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
    }
}
