//! Display models shared by the server-rendered pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;

use emporium_core::Product;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: String,
    pub in_stock: bool,
    pub stock: u32,
    pub category: String,
    pub thumbnail: Option<String>,
}

/// Format a price as dollars with two decimals.
#[must_use]
pub fn format_price(price: Decimal) -> String {
    format!("${:.2}", price.round_dp(2))
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            title: product.title.clone(),
            description: product.description.clone(),
            code: product.code.clone(),
            price: format_price(product.price),
            in_stock: product.status && product.stock > 0,
            stock: product.stock,
            category: product.category.clone(),
            thumbnail: product.thumbnails.first().cloned(),
        }
    }
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorPageTemplate {
    pub status: u16,
    pub message: String,
}

/// Render an error page with the given status.
#[must_use]
pub fn error_page(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        ErrorPageTemplate {
            status: status.as_u16(),
            message: message.into(),
        },
    )
        .into_response()
}
