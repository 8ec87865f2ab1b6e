//! Seed the product catalog from a JSON file.
//!
//! The file holds an array of product objects in the same shape the
//! `POST /api/products` endpoint accepts. Each entry goes through the
//! product repository, so validation and code uniqueness apply as usual;
//! entries that fail are logged and skipped.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use emporium_storefront::config::{ConfigError, storage_backend_from_env};
use emporium_storefront::db::{ProductError, ProductRepository, StoreError, Stores};

/// Errors that abort seeding as a whole.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed file must contain a JSON array of products")]
    NotAnArray,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Seed products into the backend configured by the environment.
///
/// # Errors
///
/// Returns `SeedError` if the configuration is invalid, the file cannot be
/// read or parsed, or the backend cannot be opened.
pub async fn products_from_env(path: &Path) -> Result<SeedSummary, SeedError> {
    dotenvy::dotenv().ok();

    let backend = storage_backend_from_env()?;
    let stores = Stores::open(&backend).await?;
    info!(backend = backend.name(), "Storage backend ready");

    products(&ProductRepository::new(stores.products), path).await
}

/// Create every product in the file through `repository`.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read or is not a JSON array, or
/// if the storage backend fails.
pub async fn products(
    repository: &ProductRepository,
    path: &Path,
) -> Result<SeedSummary, SeedError> {
    info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let Value::Array(entries) = serde_json::from_str(&content)? else {
        return Err(SeedError::NotAnArray);
    };

    let mut summary = SeedSummary::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(fields) = entry else {
            warn!(index, "Skipping entry: not a JSON object");
            summary.skipped += 1;
            continue;
        };

        match repository.create(&fields).await {
            Ok(product) => {
                info!(index, product_id = %product.id, code = %product.code, "Product seeded");
                summary.created += 1;
            }
            Err(ProductError::Store(e)) => return Err(e.into()),
            Err(e) => {
                warn!(index, error = %e, "Skipping entry");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}
