//! Cart collection manager.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use emporium_core::{Cart, CartId, PopulatedCart, Product, ProductId, ValidationError};

use super::{CartStore, CollectionStore, StoreError};

/// Errors from cart writes.
#[derive(Debug, Error)]
pub enum CartError {
    /// No cart has this ID.
    #[error("cart {0} not found")]
    CartNotFound(CartId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Repository for the cart collection.
///
/// Holds the product store as well so carts can be populated with the
/// products their items reference.
#[derive(Clone)]
pub struct CartRepository {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn CollectionStore<Product>>,
}

impl CartRepository {
    /// Create a repository over a cart store and the product store it
    /// resolves references against.
    #[must_use]
    pub fn new(carts: Arc<dyn CartStore>, products: Arc<dyn CollectionStore<Product>>) -> Self {
        Self { carts, products }
    }

    /// Create an empty cart with the next free ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or written.
    #[instrument(skip(self))]
    pub async fn create(&self) -> Result<Cart, StoreError> {
        let mut carts = self.carts.read().await?;
        let id = CartId::next(carts.iter().map(|c| c.id));
        let cart = Cart::new(id);
        carts.push(cart.clone());
        self.carts.write(&carts).await?;

        info!(cart_id = %id, "Cart created");
        Ok(cart)
    }

    /// Get a cart by its ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts.read().await?.into_iter().find(|c| c.id == id))
    }

    /// Get a cart with each item's product resolved.
    ///
    /// Items whose product has since been deleted keep their reference and
    /// carry no product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either collection cannot be read.
    pub async fn get_populated(&self, id: CartId) -> Result<Option<PopulatedCart>, StoreError> {
        let Some(cart) = self.get(id).await? else {
            return Ok(None);
        };
        let products = self.products.read().await?;
        Ok(Some(cart.populate(&products)))
    }

    /// Add one unit of a product to a cart.
    ///
    /// The product is not checked for existence here; callers that need
    /// that guarantee look it up first.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the cart does not exist and
    /// `CartError::Store` on storage failure.
    #[instrument(skip(self))]
    pub async fn add_item(&self, cart: CartId, product: ProductId) -> Result<Cart, CartError> {
        let updated = self
            .carts
            .increment_item(cart, product)
            .await?
            .ok_or(CartError::CartNotFound(cart))?;

        info!(cart_id = %cart, product_id = %product, "Item added to cart");
        Ok(updated)
    }

    /// Overwrite the quantity of an item already in a cart.
    ///
    /// Returns whether a matching item was found. A missing cart or item
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a zero quantity and
    /// `CartError::Store` on storage failure.
    #[instrument(skip(self))]
    pub async fn set_item_quantity(
        &self,
        cart: CartId,
        product: ProductId,
        quantity: u32,
    ) -> Result<bool, CartError> {
        if quantity == 0 {
            return Err(ValidationError::InvalidField {
                field: "quantity",
                reason: "must be at least 1",
            }
            .into());
        }

        let matched = self
            .carts
            .set_item_quantity(cart, product, quantity)
            .await?;
        if matched {
            info!(cart_id = %cart, product_id = %product, quantity, "Cart item quantity set");
        }
        Ok(matched)
    }

    /// Remove every item from a cart.
    ///
    /// Returns false if the cart does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or written.
    #[instrument(skip(self))]
    pub async fn clear(&self, cart: CartId) -> Result<bool, StoreError> {
        let cleared = self.carts.clear_items(cart).await?;
        if cleared {
            info!(cart_id = %cart, "Cart emptied");
        }
        Ok(cleared)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::db::{ProductRepository, Stores};

    fn repositories() -> (TempDir, CartRepository, ProductRepository) {
        let dir = tempfile::tempdir().unwrap();
        let stores = Stores::file(dir.path());
        let carts = CartRepository::new(stores.carts.clone(), stores.products.clone());
        let products = ProductRepository::new(stores.products);
        (dir, carts, products)
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let (_dir, carts, _) = repositories();

        let first = carts.create().await.unwrap();
        let second = carts.create().await.unwrap();

        assert_eq!(first.id, CartId::new(1));
        assert_eq!(second.id, CartId::new(2));
        assert!(second.items.is_empty());
    }

    #[tokio::test]
    async fn test_add_item_twice_increments_quantity() {
        let (_dir, carts, _) = repositories();
        let cart = carts.create().await.unwrap();
        let product = ProductId::new(1);

        carts.add_item(cart.id, product).await.unwrap();
        let updated = carts.add_item(cart.id, product).await.unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.item(product).unwrap().quantity, 2);
        assert_eq!(carts.get(cart.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_add_item_to_missing_cart() {
        let (_dir, carts, _) = repositories();

        assert!(matches!(
            carts.add_item(CartId::new(7), ProductId::new(1)).await,
            Err(CartError::CartNotFound(id)) if id == CartId::new(7)
        ));
    }

    #[tokio::test]
    async fn test_set_item_quantity() {
        let (_dir, carts, _) = repositories();
        let cart = carts.create().await.unwrap();
        carts.add_item(cart.id, ProductId::new(1)).await.unwrap();

        assert!(
            carts
                .set_item_quantity(cart.id, ProductId::new(1), 5)
                .await
                .unwrap()
        );
        let stored = carts.get(cart.id).await.unwrap().unwrap();
        assert_eq!(stored.item(ProductId::new(1)).unwrap().quantity, 5);

        // Absent pair is a silent no-op.
        assert!(
            !carts
                .set_item_quantity(cart.id, ProductId::new(2), 5)
                .await
                .unwrap()
        );
        assert!(matches!(
            carts.set_item_quantity(cart.id, ProductId::new(1), 0).await,
            Err(CartError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_clear_keeps_cart() {
        let (_dir, carts, _) = repositories();
        let cart = carts.create().await.unwrap();
        carts.add_item(cart.id, ProductId::new(1)).await.unwrap();

        assert!(carts.clear(cart.id).await.unwrap());
        assert_eq!(carts.get(cart.id).await.unwrap(), Some(Cart::new(cart.id)));
        assert!(!carts.clear(CartId::new(99)).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_populated_resolves_products() {
        let (_dir, carts, products) = repositories();
        let fields = json!({
            "title": "A",
            "description": "d",
            "code": "C1",
            "price": 10,
            "status": true,
            "stock": 5,
            "category": "x"
        });
        let product = products
            .create(fields.as_object().unwrap())
            .await
            .unwrap();
        let cart = carts.create().await.unwrap();
        carts.add_item(cart.id, product.id).await.unwrap();
        carts.add_item(cart.id, ProductId::new(404)).await.unwrap();

        let populated = carts.get_populated(cart.id).await.unwrap().unwrap();

        assert_eq!(populated.items[0].product.as_ref(), Some(&product));
        assert_eq!(populated.items[1].product_ref, ProductId::new(404));
        assert!(populated.items[1].product.is_none());
        assert!(carts.get_populated(CartId::new(9)).await.unwrap().is_none());
    }
}
