//! JSON API handlers.
//!
//! Documents are returned as-is; confirmations and errors share the
//! `{"status": …}` envelope.

pub mod carts;
pub mod events;
pub mod products;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// A `{"status":"success","message":…}` body.
pub(crate) fn confirmation(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "status": "success", "message": message.into() }))
}

/// Create the product API router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/events", get(events::subscribe))
        .route(
            "/{pid}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart API router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(carts::create))
        .route("/{cid}", get(carts::show).delete(carts::clear))
        .route("/{cid}/product/{pid}", post(carts::add_item))
        .route("/{cid}/products/{pid}", put(carts::set_quantity))
}

/// Create all API routes, to be nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/carts", cart_routes())
}
