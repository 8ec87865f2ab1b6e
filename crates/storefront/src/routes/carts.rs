//! Cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use emporium_core::{CartId, PopulatedCart};

use super::views::{ProductView, error_page, format_price};
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_ref: i64,
    /// `None` once the product has been deleted.
    pub product: Option<ProductView>,
    pub quantity: u32,
    pub line_price: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub id: i64,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<&PopulatedCart> for CartView {
    fn from(cart: &PopulatedCart) -> Self {
        let mut subtotal = Decimal::ZERO;
        let items = cart
            .items
            .iter()
            .map(|item| {
                let line = item
                    .product
                    .as_ref()
                    .map(|p| p.price * Decimal::from(item.quantity));
                if let Some(line) = line {
                    subtotal += line;
                }
                CartItemView {
                    product_ref: item.product_ref.as_i64(),
                    product: item.product.as_ref().map(ProductView::from),
                    quantity: item.quantity,
                    line_price: line.map(format_price),
                }
            })
            .collect();

        Self {
            id: cart.id.as_i64(),
            items,
            subtotal: format_price(subtotal),
            item_count: cart.items.iter().map(|i| u64::from(i.quantity)).sum(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "carts/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Display a cart with its products.
///
/// GET /carts/{cid}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let id = CartId::new(id);

    match state.carts().get_populated(id).await {
        Ok(Some(cart)) => CartShowTemplate {
            cart: CartView::from(&cart),
        }
        .into_response(),
        Ok(None) => error_page(StatusCode::NOT_FOUND, format!("Cart {id} not found")),
        Err(e) => {
            tracing::error!("Failed to load cart {id}: {e}");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred loading this cart.",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use emporium_core::{PopulatedItem, Product, ProductId};

    use super::*;

    #[test]
    fn test_cart_view_totals_skip_missing_products() {
        let product = Product {
            id: ProductId::new(1),
            title: "A".to_string(),
            description: "d".to_string(),
            code: "C1".to_string(),
            price: Decimal::from(10),
            status: true,
            stock: 5,
            category: "x".to_string(),
            thumbnails: Vec::new(),
        };
        let cart = PopulatedCart {
            id: CartId::new(1),
            items: vec![
                PopulatedItem {
                    product_ref: ProductId::new(1),
                    product: Some(product),
                    quantity: 3,
                },
                PopulatedItem {
                    product_ref: ProductId::new(2),
                    product: None,
                    quantity: 1,
                },
            ],
        };

        let view = CartView::from(&cart);

        assert_eq!(view.subtotal, "$30.00");
        assert_eq!(view.item_count, 4);
        assert_eq!(view.items[0].line_price.as_deref(), Some("$30.00"));
        assert!(view.items[1].product.is_none());
    }
}
