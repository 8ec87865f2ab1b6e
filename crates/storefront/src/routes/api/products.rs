//! Product API handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use emporium_core::{Fields, Page, Product, ProductId, ProductQuery, ValidationError};

use super::confirmation;
use crate::error::{AppError, Result};
use crate::events::ProductEvent;
use crate::state::AppState;

/// Paginated listing body.
#[derive(Debug, Serialize)]
struct ListEnvelope {
    status: &'static str,
    #[serde(flatten)]
    page: Page<Product>,
}

fn not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("Product {id} not found"))
}

fn into_fields(body: Value) -> std::result::Result<Fields, ValidationError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ValidationError::NotAnObject),
    }
}

/// List products.
///
/// GET /api/products
///
/// Without query parameters the whole collection is returned as an array.
/// With any of `limit`, `page`, `sort` or `query` the result is a page
/// envelope with navigation links.
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let products = state.products().list().await?;

    if query.is_empty() {
        return Ok(Json(products).into_response());
    }

    let page = query.paginate(products, "/api/products")?;
    Ok(Json(ListEnvelope {
        status: "success",
        page,
    })
    .into_response())
}

/// Get one product.
///
/// GET /api/products/{pid}
#[instrument(skip(state, id))]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    let product = state.products().get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// Create a product.
///
/// POST /api/products
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let Json(body) = body?;
    let product = state.products().create(&into_fields(body)?).await?;

    state
        .events()
        .publish(ProductEvent::ProductAdded(product.clone()));

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update some fields of a product.
///
/// PUT /api/products/{pid}
#[instrument(skip(state, id, body))]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    let Json(body) = body?;

    let product = state
        .products()
        .update(id, &into_fields(body)?)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(product))
}

/// Delete a product.
///
/// DELETE /api/products/{pid}
#[instrument(skip(state, id))]
pub async fn delete(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Value>> {
    let Path(id) = id?;

    if !state.products().delete(id).await? {
        return Err(not_found(id));
    }

    state.events().publish(ProductEvent::ProductDeleted(id));

    Ok(confirmation(format!("Product {id} deleted")))
}
