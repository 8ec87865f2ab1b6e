//! Integration tests for the cart API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use emporium_integration_tests::{TestContext, product_fields};

#[tokio::test]
async fn test_cart_scenario() {
    let ctx = TestContext::new();

    let cart = ctx.create_cart().await;
    assert_eq!(cart, json!({ "id": 1, "items": [] }));

    let (status, body) = ctx.get("/api/carts/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "items": [] }));

    let product = ctx
        .create_product(json!({
            "title": "A",
            "description": "d",
            "code": "C1",
            "price": 10,
            "status": true,
            "stock": 5,
            "category": "x"
        }))
        .await;
    assert_eq!(product["id"], 1);

    let (status, cart) = ctx.post("/api/carts/1/product/1", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        cart,
        json!({ "id": 1, "items": [{ "productRef": 1, "quantity": 1 }] })
    );

    let (_, cart) = ctx.post("/api/carts/1/product/1", json!({})).await;
    assert_eq!(cart["items"], json!([{ "productRef": 1, "quantity": 2 }]));

    let (_, body) = ctx.get("/api/carts/1").await;
    assert_eq!(body, json!({ "items": [{ "productRef": 1, "quantity": 2 }] }));
}

#[tokio::test]
async fn test_add_item_requires_cart_and_product() {
    let ctx = TestContext::new();
    ctx.create_cart().await;
    ctx.create_product(product_fields("C1", 10.0, true, "x"))
        .await;

    let (status, body) = ctx.post("/api/carts/1/product/9", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product 9 not found");

    let (status, body) = ctx.post("/api/carts/9/product/1", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cart 9 not found");
}

#[tokio::test]
async fn test_missing_cart_is_404() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/api/carts/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_populate_resolves_products() {
    let ctx = TestContext::new();
    ctx.create_cart().await;
    let product = ctx
        .create_product(product_fields("C1", 10.0, true, "x"))
        .await;
    ctx.post("/api/carts/1/product/1", json!({})).await;

    let (status, body) = ctx.get("/api/carts/1?populate=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["product"], product);
    assert_eq!(body["items"][0]["quantity"], 1);

    // A deleted product leaves its reference behind.
    ctx.delete("/api/products/1").await;
    let (_, body) = ctx.get("/api/carts/1?populate=true").await;
    assert_eq!(body["items"][0]["productRef"], 1);
    assert!(body["items"][0]["product"].is_null());
}

#[tokio::test]
async fn test_set_quantity() {
    let ctx = TestContext::new();
    ctx.create_cart().await;
    ctx.create_product(product_fields("C1", 10.0, true, "x"))
        .await;
    ctx.post("/api/carts/1/product/1", json!({})).await;

    let (status, body) = ctx
        .put("/api/carts/1/products/1", json!({ "quantity": 7 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(ctx.get("/api/carts/1").await.1["items"][0]["quantity"], 7);
}

#[tokio::test]
async fn test_set_quantity_on_absent_pair_is_silent() {
    let ctx = TestContext::new();
    ctx.create_cart().await;

    let (status, body) = ctx
        .put("/api/carts/1/products/5", json!({ "quantity": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, _) = ctx
        .put("/api/carts/8/products/5", json!({ "quantity": 3 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.get("/api/carts/1").await.1, json!({ "items": [] }));
}

#[tokio::test]
async fn test_set_quantity_rejects_bad_quantity() {
    let ctx = TestContext::new();
    ctx.create_cart().await;

    let (status, _) = ctx
        .put("/api/carts/1/products/1", json!({ "quantity": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .put("/api/carts/1/products/1", json!({ "quantity": "lots" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let ctx = TestContext::new();
    ctx.create_cart().await;
    ctx.create_product(product_fields("C1", 10.0, true, "x"))
        .await;
    ctx.post("/api/carts/1/product/1", json!({})).await;

    let (status, body) = ctx.delete("/api/carts/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(ctx.get("/api/carts/1").await.1, json!({ "items": [] }));
}
