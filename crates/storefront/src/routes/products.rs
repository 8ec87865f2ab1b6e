//! Product listing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{DEFAULT_PAGE, ProductQuery};

use super::views::{ProductView, error_page};
use crate::state::AppState;

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<usize>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub current_page: usize,
    pub total_pages: usize,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

/// Display one page of the catalog.
///
/// GET /products?page=N
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PaginationQuery>,
) -> Response {
    let query = ProductQuery {
        page: Some(params.page.unwrap_or(DEFAULT_PAGE).max(1)),
        ..ProductQuery::default()
    };

    let products = match state.products().list().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to load products: {e}");
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred loading the catalog.",
            );
        }
    };

    match query.paginate(products, "/products") {
        Ok(page) => ProductsIndexTemplate {
            products: page.payload.iter().map(ProductView::from).collect(),
            current_page: page.page,
            total_pages: page.total_pages,
            prev_link: page.prev_link,
            next_link: page.next_link,
        }
        .into_response(),
        Err(e) => error_page(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
