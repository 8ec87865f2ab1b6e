//! Filtering, sorting and page-windowing for product listings.
//!
//! # Query Parameters
//!
//! - `limit` - page size (default 10, must be at least 1)
//! - `page` - 1-based page number (default 1)
//! - `sort` - `asc` or `desc` by price; omitted keeps collection order
//! - `query` - `true`/`false` filters on `status`, anything else on `category`

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::error::ValidationError;
use super::product::Product;

/// Page size used when `limit` is omitted.
pub const DEFAULT_LIMIT: usize = 10;

/// Page number used when `page` is omitted.
pub const DEFAULT_PAGE: usize = 1;

/// Price ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Equality filter derived from the `query` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    Status(bool),
    Category(String),
}

impl ProductFilter {
    /// Interpret a raw `query` value.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        match query {
            "true" => Self::Status(true),
            "false" => Self::Status(false),
            category => Self::Category(category.to_owned()),
        }
    }

    /// Returns true if `product` passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::Status(status) => product.status == *status,
            Self::Category(category) => product.category == *category,
        }
    }
}

/// Listing parameters as they appear in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductQuery {
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub sort: Option<SortOrder>,
    pub query: Option<String>,
}

/// One window of a listing plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub payload: Vec<T>,
    pub total_docs: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub page: usize,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

impl ProductQuery {
    /// Returns true if no listing parameter was supplied at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The filter implied by `query`, if any. An empty string filters nothing.
    #[must_use]
    pub fn filter(&self) -> Option<ProductFilter> {
        self.query
            .as_deref()
            .filter(|query| !query.is_empty())
            .map(ProductFilter::parse)
    }

    /// Effective page size.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidField` if `limit` is zero.
    pub fn limit(&self) -> Result<usize, ValidationError> {
        match self.limit {
            Some(0) => Err(ValidationError::invalid("limit", "must be at least 1")),
            Some(limit) => Ok(limit),
            None => Ok(DEFAULT_LIMIT),
        }
    }

    /// Effective 1-based page number.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidField` if `page` is zero.
    pub fn page(&self) -> Result<usize, ValidationError> {
        match self.page {
            Some(0) => Err(ValidationError::invalid("page", "must be at least 1")),
            Some(page) => Ok(page),
            None => Ok(DEFAULT_PAGE),
        }
    }

    /// Filter, sort and window `products`.
    ///
    /// Navigation links point at `base_path` and repeat this query's
    /// `limit`, `sort` and `query` so following them keeps the same view.
    /// A page past the end yields an empty payload.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `limit` or `page` is zero.
    pub fn paginate(
        &self,
        products: Vec<Product>,
        base_path: &str,
    ) -> Result<Page<Product>, ValidationError> {
        let limit = self.limit()?;
        let page = self.page()?;

        let mut matching: Vec<Product> = match self.filter() {
            Some(filter) => products.into_iter().filter(|p| filter.matches(p)).collect(),
            None => products,
        };

        // Stable sorts keep collection order among equal prices.
        match self.sort {
            Some(SortOrder::Asc) => matching.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(SortOrder::Desc) => matching.sort_by(|a, b| b.price.cmp(&a.price)),
            None => {}
        }

        let total_docs = matching.len();
        let total_pages = total_docs.div_ceil(limit).max(1);
        let offset = (page - 1).saturating_mul(limit);

        let payload: Vec<Product> = matching.into_iter().skip(offset).take(limit).collect();

        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;
        let prev_page = has_prev_page.then(|| page - 1);
        let next_page = has_next_page.then(|| page + 1);

        Ok(Page {
            payload,
            total_docs,
            limit,
            total_pages,
            page,
            has_prev_page,
            has_next_page,
            prev_page,
            next_page,
            prev_link: prev_page.map(|p| self.link(base_path, limit, p)),
            next_link: next_page.map(|p| self.link(base_path, limit, p)),
        })
    }

    fn link(&self, base_path: &str, limit: usize, page: usize) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("page", &page.to_string());
        query.append_pair("limit", &limit.to_string());
        if let Some(sort) = self.sort {
            query.append_pair("sort", sort.as_str());
        }
        if let Some(filter) = self.query.as_deref().filter(|q| !q.is_empty()) {
            query.append_pair("query", filter);
        }
        format!("{base_path}?{}", query.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::id::ProductId;

    fn product(id: i64, price: i64, status: bool, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("P{id}"),
            description: String::new(),
            code: format!("C{id}"),
            price: Decimal::from(price),
            status,
            stock: 1,
            category: category.to_owned(),
            thumbnails: Vec::new(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, 30, true, "a"),
            product(2, 10, false, "b"),
            product(3, 20, true, "a"),
            product(4, 5, false, "a"),
            product(5, 15, true, "b"),
        ]
    }

    fn ids(page: &Page<Product>) -> Vec<i64> {
        page.payload.iter().map(|p| p.id.as_i64()).collect()
    }

    #[test]
    fn test_status_filter_sorted_first_page() {
        let query = ProductQuery {
            limit: Some(2),
            page: Some(1),
            sort: Some(SortOrder::Asc),
            query: Some("true".to_owned()),
        };

        let page = query.paginate(catalog(), "/api/products").unwrap();

        assert_eq!(ids(&page), vec![5, 3]);
        assert_eq!(page.total_docs, 3);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next_page);
        assert!(!page.has_prev_page);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.prev_page, None);
        assert_eq!(
            page.next_link.as_deref(),
            Some("/api/products?page=2&limit=2&sort=asc&query=true")
        );
        assert_eq!(page.prev_link, None);
    }

    #[test]
    fn test_category_filter_desc() {
        let query = ProductQuery {
            sort: Some(SortOrder::Desc),
            query: Some("a".to_owned()),
            ..ProductQuery::default()
        };

        let page = query.paginate(catalog(), "/api/products").unwrap();
        assert_eq!(ids(&page), vec![1, 3, 4]);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_defaults_keep_collection_order() {
        let query = ProductQuery::default();
        assert!(query.is_empty());

        let page = query.paginate(catalog(), "/api/products").unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
        assert_eq!(page.limit, DEFAULT_LIMIT);
        assert_eq!(page.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let query = ProductQuery {
            limit: Some(2),
            page: Some(9),
            ..ProductQuery::default()
        };

        let page = query.paginate(catalog(), "/products").unwrap();
        assert!(page.payload.is_empty());
        assert!(!page.has_next_page);
        assert_eq!(page.next_link, None);
        assert_eq!(page.prev_link.as_deref(), Some("/products?page=8&limit=2"));
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page = ProductQuery::default()
            .paginate(Vec::new(), "/api/products")
            .unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.payload.is_empty());
    }

    #[test]
    fn test_zero_limit_or_page_rejected() {
        let zero_limit = ProductQuery {
            limit: Some(0),
            ..ProductQuery::default()
        };
        assert!(zero_limit.paginate(catalog(), "/").is_err());

        let zero_page = ProductQuery {
            page: Some(0),
            ..ProductQuery::default()
        };
        assert!(zero_page.paginate(catalog(), "/").is_err());
    }

    #[test]
    fn test_empty_query_string_filters_nothing() {
        let query = ProductQuery {
            query: Some(String::new()),
            ..ProductQuery::default()
        };
        assert_eq!(query.filter(), None);
    }

    #[test]
    fn test_link_encodes_category() {
        let query = ProductQuery {
            limit: Some(1),
            query: Some("home & garden".to_owned()),
            ..ProductQuery::default()
        };
        let mut products = catalog();
        for p in &mut products {
            p.category = "home & garden".to_owned();
        }

        let page = query.paginate(products, "/api/products").unwrap();
        assert_eq!(
            page.next_link.as_deref(),
            Some("/api/products?page=2&limit=1&query=home+%26+garden")
        );
    }
}
