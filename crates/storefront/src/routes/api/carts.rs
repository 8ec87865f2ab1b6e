//! Cart API handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use emporium_core::{Cart, CartId, ProductId};

use super::confirmation;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Options for reading a cart.
#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    /// Resolve each item's product reference.
    #[serde(default)]
    pub populate: bool,
}

/// Body of a quantity update.
#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

fn cart_not_found(id: CartId) -> AppError {
    AppError::NotFound(format!("Cart {id} not found"))
}

/// Create an empty cart.
///
/// POST /api/carts
#[instrument(skip(state))]
pub async fn create(State(state): State<AppState>) -> Result<(StatusCode, Json<Cart>)> {
    let cart = state.carts().create().await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Get the items of a cart.
///
/// GET /api/carts/{cid}?populate=true
#[instrument(skip(state, id, query))]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<CartId>, PathRejection>,
    query: std::result::Result<Query<ShowQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Path(id) = id?;
    let Query(query) = query?;

    let items = if query.populate {
        let cart = state
            .carts()
            .get_populated(id)
            .await?
            .ok_or_else(|| cart_not_found(id))?;
        json!(cart.items)
    } else {
        let cart = state
            .carts()
            .get(id)
            .await?
            .ok_or_else(|| cart_not_found(id))?;
        json!(cart.items)
    };

    Ok(Json(json!({ "items": items })))
}

/// Add one unit of a product to a cart.
///
/// POST /api/carts/{cid}/product/{pid}
///
/// The product must exist; the cart and product lookups are independent
/// reads.
#[instrument(skip(state, ids))]
pub async fn add_item(
    State(state): State<AppState>,
    ids: std::result::Result<Path<(CartId, ProductId)>, PathRejection>,
) -> Result<Json<Cart>> {
    let Path((cart_id, product_id)) = ids?;

    if state.products().get(product_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Product {product_id} not found"
        )));
    }

    let cart = state.carts().add_item(cart_id, product_id).await?;
    Ok(Json(cart))
}

/// Overwrite the quantity of an item.
///
/// PUT /api/carts/{cid}/products/{pid}
///
/// A cart or item that does not exist is left alone and still answered
/// with success.
#[instrument(skip(state, ids, body))]
pub async fn set_quantity(
    State(state): State<AppState>,
    ids: std::result::Result<Path<(CartId, ProductId)>, PathRejection>,
    body: std::result::Result<Json<QuantityUpdate>, JsonRejection>,
) -> Result<Json<Value>> {
    let Path((cart_id, product_id)) = ids?;
    let Json(update) = body?;

    let matched = state
        .carts()
        .set_item_quantity(cart_id, product_id, update.quantity)
        .await?;
    if !matched {
        debug!(cart_id = %cart_id, product_id = %product_id, "No cart item to update");
    }

    Ok(confirmation("Quantity updated"))
}

/// Remove every item from a cart.
///
/// DELETE /api/carts/{cid}
#[instrument(skip(state, id))]
pub async fn clear(
    State(state): State<AppState>,
    id: std::result::Result<Path<CartId>, PathRejection>,
) -> Result<Json<Value>> {
    let Path(id) = id?;

    if !state.carts().clear(id).await? {
        debug!(cart_id = %id, "No cart to empty");
    }

    Ok(confirmation("Cart emptied"))
}
