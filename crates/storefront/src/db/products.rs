//! Product collection manager.
//!
//! Every operation reads the current collection from the store, computes the
//! new collection and writes it back; nothing is cached between calls.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use emporium_core::{Fields, NewProduct, Product, ProductId, ProductPatch, ValidationError};

use super::{CollectionStore, StoreError};

/// Errors from product writes.
#[derive(Debug, Error)]
pub enum ProductError {
    /// The input could not be coerced into a valid product.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another product already uses this code.
    #[error("a product with code {0:?} already exists")]
    DuplicateCode(String),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Repository for the product collection.
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn CollectionStore<Product>>,
}

impl ProductRepository {
    /// Create a repository over a product store.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore<Product>>) -> Self {
        Self { store }
    }

    /// Get every product, unfiltered, in persisted order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.store.read().await
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.store.read().await?.into_iter().find(|p| p.id == id))
    }

    /// Validate raw fields and create a product from them.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if a required field is missing or
    /// malformed, `ProductError::DuplicateCode` if the code is taken, and
    /// `ProductError::Store` if the collection cannot be read or written.
    #[instrument(skip(self, fields))]
    pub async fn create(&self, fields: &Fields) -> Result<Product, ProductError> {
        let product = NewProduct::from_fields(fields)?;
        self.insert(product).await
    }

    /// Create an already validated product.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::DuplicateCode` if the code is taken and
    /// `ProductError::Store` if the collection cannot be read or written.
    #[instrument(skip(self, product), fields(code = %product.code))]
    pub async fn insert(&self, product: NewProduct) -> Result<Product, ProductError> {
        let mut products = self.store.read().await?;

        if products.iter().any(|p| p.code == product.code) {
            return Err(ProductError::DuplicateCode(product.code));
        }

        let id = ProductId::next(products.iter().map(|p| p.id));
        let product = product.into_product(id);
        products.push(product.clone());
        self.store.write(&products).await?;

        info!(product_id = %id, "Product created");
        Ok(product)
    }

    /// Merge raw fields over an existing product.
    ///
    /// Returns `None` if no product has this ID. An `id` in `fields` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` if a given field is malformed,
    /// `ProductError::DuplicateCode` if the new code belongs to another
    /// product, and `ProductError::Store` on storage failure.
    #[instrument(skip(self, fields))]
    pub async fn update(
        &self,
        id: ProductId,
        fields: &Fields,
    ) -> Result<Option<Product>, ProductError> {
        let mut products = self.store.read().await?;
        if !products.iter().any(|p| p.id == id) {
            return Ok(None);
        }

        let patch = ProductPatch::from_fields(fields)?;
        if let Some(code) = &patch.code
            && products.iter().any(|p| p.id != id && p.code == *code)
        {
            return Err(ProductError::DuplicateCode(code.clone()));
        }

        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply(product);
        let updated = product.clone();

        self.store.write(&products).await?;

        info!(product_id = %id, "Product updated");
        Ok(Some(updated))
    }

    /// Delete a product.
    ///
    /// Returns whether a product was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or written.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut products = self.store.read().await?;
        let before = products.len();
        products.retain(|p| p.id != id);

        if products.len() == before {
            return Ok(false);
        }

        self.store.write(&products).await?;

        info!(product_id = %id, "Product deleted");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;
    use crate::db::Stores;

    fn repository() -> (TempDir, ProductRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = ProductRepository::new(Stores::file(dir.path()).products);
        (dir, repo)
    }

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn product_fields(code: &str) -> Fields {
        fields(json!({
            "title": "A",
            "description": "d",
            "code": code,
            "price": 10,
            "status": true,
            "stock": 5,
            "category": "x"
        }))
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_document() {
        let (_dir, repo) = repository();

        let created = repo.create(&product_fields("C1")).await.unwrap();
        assert_eq!(created.id, ProductId::new(1));

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_create_assigns_max_plus_one() {
        let (_dir, repo) = repository();

        repo.create(&product_fields("C1")).await.unwrap();
        let second = repo.create(&product_fields("C2")).await.unwrap();
        let third = repo.create(&product_fields("C3")).await.unwrap();
        assert!(repo.delete(second.id).await.unwrap());

        // The gap left by #2 is not reused; #4 follows the maximum.
        let fourth = repo.create(&product_fields("C4")).await.unwrap();
        assert_eq!(third.id, ProductId::new(3));
        assert_eq!(fourth.id, ProductId::new(4));
    }

    #[tokio::test]
    async fn test_create_duplicate_code_fails() {
        let (_dir, repo) = repository();
        repo.create(&product_fields("C1")).await.unwrap();

        let mut other = product_fields("C1");
        other.insert("title".to_owned(), json!("Completely different"));
        other.insert("price".to_owned(), json!(99));

        assert!(matches!(
            repo.create(&other).await,
            Err(ProductError::DuplicateCode(code)) if code == "C1"
        ));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_missing_field_fails_without_writing() {
        let (_dir, repo) = repository();
        let mut input = product_fields("C1");
        input.remove("category");

        assert!(matches!(
            repo.create(&input).await,
            Err(ProductError::Validation(ValidationError::MissingField(
                "category"
            )))
        ));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let (_dir, repo) = repository();
        let created = repo.create(&product_fields("C1")).await.unwrap();

        let updated = repo
            .update(created.id, &fields(json!({ "title": "X", "id": 42 })))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "X");
        assert_eq!(
            Product {
                title: created.title.clone(),
                ..updated.clone()
            },
            created
        );
        assert_eq!(repo.get(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_rejects_code_of_another_product() {
        let (_dir, repo) = repository();
        repo.create(&product_fields("C1")).await.unwrap();
        let second = repo.create(&product_fields("C2")).await.unwrap();

        assert!(matches!(
            repo.update(second.id, &fields(json!({ "code": "C1" }))).await,
            Err(ProductError::DuplicateCode(_))
        ));

        // Re-saving a product's own code is fine.
        assert!(
            repo.update(second.id, &fields(json!({ "code": "C2" })))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_product() {
        let (_dir, repo) = repository();

        assert!(
            repo.update(ProductId::new(9), &fields(json!({ "title": "X" })))
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete(ProductId::new(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_product_ignores_taken_code_and_bad_fields() {
        let (_dir, repo) = repository();
        repo.create(&product_fields("C1")).await.unwrap();

        assert!(
            repo.update(ProductId::new(99), &fields(json!({ "code": "C1" })))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.update(ProductId::new(99), &fields(json!({ "stock": "lots" })))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_high_precision_price_matches_stored_document() {
        let (_dir, repo) = repository();
        let mut input = product_fields("C1");
        input.insert("price".to_owned(), json!("0.12345678901234567891"));

        let created = repo.create(&input).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }
}
