//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (reads the catalog)
//!
//! # Pages
//! GET  /                           - All products
//! GET  /products?page=N            - Paginated catalog
//! GET  /carts/{cid}                - Cart with its products
//! GET  /realtimeproducts           - Live product management
//!
//! # Products API
//! GET    /api/products             - List (array, or page envelope with query params)
//! GET    /api/products/events      - Live product events (SSE)
//! GET    /api/products/{pid}       - Get one product
//! POST   /api/products             - Create
//! PUT    /api/products/{pid}       - Update some fields
//! DELETE /api/products/{pid}       - Delete
//!
//! # Carts API
//! POST   /api/carts                - Create an empty cart
//! GET    /api/carts/{cid}          - Cart items (`?populate=true` resolves products)
//! POST   /api/carts/{cid}/product/{pid}  - Add one unit of a product
//! PUT    /api/carts/{cid}/products/{pid} - Set an item's quantity
//! DELETE /api/carts/{cid}          - Empty the cart
//! ```
//!
//! Each method and path pair is registered exactly once.

pub mod api;
pub mod carts;
pub mod home;
pub mod products;
pub mod realtime;
pub mod views;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    middleware::from_fn,
    routing::get,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the server-rendered page routes.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/carts/{cid}", get(carts::show))
        .route("/realtimeproducts", get(realtime::index))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(page_routes())
        .nest("/api", api::routes())
        .fallback(route_not_found)
}

/// Build the complete application with request tracing.
///
/// Sentry layers are added by the binary, outside of this router.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the product collection can be read before returning OK.
/// Returns 503 Service Unavailable if the storage backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.products().list().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(
                backend = state.config().backend.name(),
                "Readiness check failed: {e}"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
