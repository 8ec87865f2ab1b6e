//! Home page route handler.

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

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductView>,
}

/// Display every product.
///
/// GET /
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Response {
    match state.products().list().await {
        Ok(products) => HomeTemplate {
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
