//! Integration tests for Emporium.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```
//!
//! Every test drives the real storefront router in-process against a fresh
//! file backend in a temporary directory; no server or database is needed.
//!
//! # Test Categories
//!
//! - `api_products` - Product API, listing and pagination
//! - `api_carts` - Cart API and cart-product linkage
//! - `pages` - Server-rendered pages and fallbacks

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use emporium_storefront::config::StorefrontConfig;
use emporium_storefront::db::Stores;
use emporium_storefront::routes;
use emporium_storefront::state::AppState;

/// A storefront over an empty temporary data directory.
pub struct TestContext {
    pub state: AppState,
    app: Router,
    dir: TempDir,
}

impl TestContext {
    /// Build a storefront with empty collections.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig::local(dir.path());
        let state = AppState::new(config, Stores::file(dir.path()));
        let app = routes::app(state.clone());
        Self { state, app, dir }
    }

    /// The data directory backing the collections.
    #[must_use]
    pub fn data_dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Send a request and return the status and raw body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Send a request and parse the JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, body) = self.send(method, uri, body).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.json(Method::DELETE, uri, None).await
    }

    /// Create a product through the API, asserting success.
    pub async fn create_product(&self, fields: Value) -> Value {
        let (status, body) = self.post("/api/products", fields).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    /// Create an empty cart through the API, asserting success.
    pub async fn create_cart(&self) -> Value {
        let (status, body) = self.json(Method::POST, "/api/carts", None).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Product fields with every required field set.
#[must_use]
pub fn product_fields(code: &str, price: f64, status: bool, category: &str) -> Value {
    serde_json::json!({
        "title": format!("Product {code}"),
        "description": "d",
        "code": code,
        "price": price,
        "status": status,
        "stock": 5,
        "category": category
    })
}
