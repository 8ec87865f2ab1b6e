//! Live product management page.
//!
//! The page lists the catalog, adds and deletes products through the JSON
//! API and follows `/api/products/events` to stay current across tabs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::views::{ProductView, error_page};
use crate::state::AppState;

/// Live products page template.
#[derive(Template, WebTemplate)]
#[template(path = "realtime.html")]
pub struct RealtimeTemplate {
    pub products: Vec<ProductView>,
}

/// GET /realtimeproducts
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Response {
    match state.products().list().await {
        Ok(products) => RealtimeTemplate {
            products: products.iter().map(ProductView::from).collect(),
        }
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to load products: {e}");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred loading the catalog.",
            )
        }
    }
}
