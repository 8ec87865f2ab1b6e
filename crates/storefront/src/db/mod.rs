//! Document storage for the product and cart collections.
//!
//! # Backends
//!
//! Every collection is reached through [`CollectionStore`], a narrow
//! snapshot contract: `read` the whole collection, `write` it back. Two
//! adapters implement it and are selected once, at startup:
//!
//! - [`file::JsonFileStore`] - one pretty-printed JSON array per collection
//!   (`products.json`, `carts.json`) in a data directory
//! - [`postgres::PgDocumentStore`] - JSONB documents in `store.documents`
//!
//! Carts additionally go through [`CartStore`], whose targeted item updates
//! run as single atomic statements on the database backend and fall back to
//! read-modify-write on the file backend.
//!
//! # Concurrency
//!
//! Repositories keep no state between calls; every operation re-reads the
//! collection. Two concurrent read-modify-write cycles on the same collection
//! can still both start from the same snapshot, and the later write wins.
//!
//! # Migrations
//!
//! Database migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p emporium-cli -- migrate
//! ```

pub mod carts;
pub mod file;
pub mod postgres;
pub mod products;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use emporium_core::{Cart, CartId, Document, Product, ProductId};

pub use carts::{CartError, CartRepository};
pub use file::JsonFileStore;
pub use postgres::PgDocumentStore;
pub use products::{ProductError, ProductRepository};

use crate::config::StorageBackend;

/// Errors raised by a storage backend.
///
/// A collection that does not exist yet is never an error; it reads as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Persisted data could not be parsed back into documents.
    #[error("data corruption in {collection}: {reason}")]
    Corrupt {
        collection: &'static str,
        reason: String,
    },

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Snapshot access to one collection.
#[async_trait]
pub trait CollectionStore<D: Document>: Send + Sync {
    /// Read the whole collection, in persisted order.
    ///
    /// Returns an empty collection if nothing has been persisted yet.
    async fn read(&self) -> Result<Vec<D>, StoreError>;

    /// Replace the whole collection.
    ///
    /// Either the new snapshot becomes visible in full or, on error, the
    /// previous one stays in place.
    async fn write(&self, documents: &[D]) -> Result<(), StoreError>;
}

/// Cart collection with targeted item updates.
///
/// The provided implementations are read-modify-write cycles over the
/// snapshot; backends with field-level updates override them.
#[async_trait]
pub trait CartStore: CollectionStore<Cart> {
    /// Add one unit of `product` to `cart`.
    ///
    /// Returns the updated cart, or `None` if the cart does not exist.
    async fn increment_item(
        &self,
        cart: CartId,
        product: ProductId,
    ) -> Result<Option<Cart>, StoreError> {
        let mut carts = self.read().await?;
        let Some(target) = carts.iter_mut().find(|c| c.id == cart) else {
            return Ok(None);
        };
        target.add_product(product);
        let updated = target.clone();

        self.write(&carts).await?;
        Ok(Some(updated))
    }

    /// Overwrite the quantity of the `(cart, product)` item.
    ///
    /// Returns false, changing nothing, if no such item exists.
    async fn set_item_quantity(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<bool, StoreError> {
        let mut carts = self.read().await?;
        let matched = carts
            .iter_mut()
            .find(|c| c.id == cart)
            .is_some_and(|c| c.set_quantity(product, quantity));

        if matched {
            self.write(&carts).await?;
        }
        Ok(matched)
    }

    /// Remove every item from `cart`.
    ///
    /// Returns false if the cart does not exist.
    async fn clear_items(&self, cart: CartId) -> Result<bool, StoreError> {
        let mut carts = self.read().await?;
        let Some(target) = carts.iter_mut().find(|c| c.id == cart) else {
            return Ok(false);
        };
        target.clear();

        self.write(&carts).await?;
        Ok(true)
    }
}

/// The two collections, backed by whichever adapter was configured.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn CollectionStore<Product>>,
    pub carts: Arc<dyn CartStore>,
}

impl Stores {
    /// JSON files under `data_dir`.
    #[must_use]
    pub fn file(data_dir: &Path) -> Self {
        Self {
            products: Arc::new(JsonFileStore::<Product>::in_dir(data_dir)),
            carts: Arc::new(JsonFileStore::<Cart>::in_dir(data_dir)),
        }
    }

    /// JSONB documents in `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            products: Arc::new(PgDocumentStore::<Product>::new(pool.clone())),
            carts: Arc::new(PgDocumentStore::<Cart>::new(pool.clone())),
        }
    }

    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the database pool cannot connect.
    pub async fn open(backend: &StorageBackend) -> Result<Self, StoreError> {
        match backend {
            StorageBackend::File { data_dir } => {
                tracing::info!(data_dir = %data_dir.display(), "Using JSON file storage");
                Ok(Self::file(data_dir))
            }
            StorageBackend::Postgres { database_url } => {
                let pool = create_pool(database_url).await?;
                tracing::info!("Using PostgreSQL document storage");
                Ok(Self::postgres(&pool))
            }
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
