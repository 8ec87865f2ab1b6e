//! Shopping carts and their line items.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::id::{CartId, ProductId};
use super::product::Product;

/// One product reference inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_ref: ProductId,
    /// Always at least 1.
    pub quantity: u32,
}

/// A shopping cart.
///
/// Holds at most one [`CartItem`] per distinct product. Whether the
/// referenced products exist is checked by callers, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// A cart item with its product reference resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedItem {
    pub product_ref: ProductId,
    /// `None` if the referenced product no longer exists.
    pub product: Option<Product>,
    pub quantity: u32,
}

/// A cart whose items carry full product documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulatedCart {
    pub id: CartId,
    pub items: Vec<PopulatedItem>,
}

impl Document for Cart {
    const COLLECTION: &'static str = "carts";

    fn key(&self) -> i64 {
        self.id.as_i64()
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    /// Look up the item for a product.
    #[must_use]
    pub fn item(&self, product: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_ref == product)
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing item's quantity, or appends a new item with
    /// quantity 1. Returns the product's resulting quantity.
    pub fn add_product(&mut self, product: ProductId) -> u32 {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_ref == product)
        {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }

        self.items.push(CartItem {
            product_ref: product,
            quantity: 1,
        });
        1
    }

    /// Overwrite the quantity of an existing item.
    ///
    /// Returns false (and changes nothing) if the product is not in the cart.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> bool {
        match self
            .items
            .iter_mut()
            .find(|item| item.product_ref == product)
        {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Resolve every item's product reference against `products`.
    #[must_use]
    pub fn populate(&self, products: &[Product]) -> PopulatedCart {
        PopulatedCart {
            id: self.id,
            items: self
                .items
                .iter()
                .map(|item| PopulatedItem {
                    product_ref: item.product_ref,
                    product: products.iter().find(|p| p.id == item.product_ref).cloned(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}
