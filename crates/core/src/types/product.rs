//! Product documents and the coercion of raw request fields into them.
//!
//! Request bodies arrive as loosely typed JSON objects. [`NewProduct`] and
//! [`ProductPatch`] turn them into strongly typed values, coercing each field
//! to its declared type or naming the field that could not be coerced.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::Document;
use super::error::ValidationError;
use super::id::ProductId;

/// A raw JSON object as received from a client.
pub type Fields = serde_json::Map<String, Value>;

/// Fields that must be present when creating a product, in check order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "title",
    "description",
    "code",
    "price",
    "status",
    "stock",
    "category",
];

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Immutable once assigned.
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Unique across the product collection.
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Whether the product is available for sale.
    pub status: bool,
    pub stock: u32,
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn key(&self) -> i64 {
        self.id.as_i64()
    }
}

/// A validated product that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: Decimal,
    pub status: bool,
    pub stock: u32,
    pub category: String,
    pub thumbnails: Vec<String>,
}

impl NewProduct {
    /// Coerce a raw JSON object into a new product.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for the first required field
    /// that is absent or `null`, and `ValidationError::InvalidField` when a
    /// present field cannot be coerced to its type.
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationError> {
        for key in REQUIRED_FIELDS {
            if present(fields, key).is_none() {
                return Err(ValidationError::MissingField(key));
            }
        }

        Ok(Self {
            title: coerce_string("title", required(fields, "title")?)?,
            description: coerce_string("description", required(fields, "description")?)?,
            code: coerce_string("code", required(fields, "code")?)?,
            price: coerce_price(required(fields, "price")?)?,
            status: coerce_status(required(fields, "status")?)?,
            stock: coerce_stock(required(fields, "stock")?)?,
            category: coerce_string("category", required(fields, "category")?)?,
            // Anything that isn't an array silently becomes "no thumbnails".
            thumbnails: present(fields, "thumbnails")
                .and_then(Value::as_array)
                .map(|items| coerce_thumbnails(items))
                .unwrap_or_default(),
        })
    }

    /// Attach an identifier, producing the document to persist.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            code: self.code,
            price: self.price,
            status: self.status,
            stock: self.stock,
            category: self.category,
            thumbnails: self.thumbnails,
        }
    }
}

/// A partial update: every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<bool>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    /// Coerce a raw JSON object into a patch.
    ///
    /// The `id` field is dropped, as are unknown fields and `null` values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidField` when a present field cannot
    /// be coerced to its type.
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationError> {
        let string = |key: &'static str| {
            present(fields, key)
                .map(|value| coerce_string(key, value))
                .transpose()
        };

        Ok(Self {
            title: string("title")?,
            description: string("description")?,
            code: string("code")?,
            price: present(fields, "price").map(coerce_price).transpose()?,
            status: present(fields, "status").map(coerce_status).transpose()?,
            stock: present(fields, "stock").map(coerce_stock).transpose()?,
            category: string("category")?,
            thumbnails: present(fields, "thumbnails")
                .map(|value| {
                    value
                        .as_array()
                        .map(|items| coerce_thumbnails(items))
                        .ok_or(ValidationError::invalid("thumbnails", "expected an array"))
                })
                .transpose()?,
        })
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge the patch over `product`; absent fields are kept.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(code) = self.code {
            product.code = code;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(thumbnails) = self.thumbnails {
            product.thumbnails = thumbnails;
        }
    }
}

// =============================================================================
// Coercion Helpers
// =============================================================================

fn present<'a>(fields: &'a Fields, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn required<'a>(fields: &'a Fields, key: &'static str) -> Result<&'a Value, ValidationError> {
    present(fields, key).ok_or(ValidationError::MissingField(key))
}

fn coerce_string(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ValidationError::invalid(field, "expected a string")),
    }
}

fn coerce_price(value: &Value) -> Result<Decimal, ValidationError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return Err(ValidationError::invalid("price", "expected a number")),
    };

    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ValidationError::invalid("price", "expected a number"))?;

    if price < Decimal::ZERO {
        return Err(ValidationError::invalid("price", "must not be negative"));
    }
    float_representable(price)
}

/// Round `price` to the value it reads back as once stored as a JSON float.
fn float_representable(price: Decimal) -> Result<Decimal, ValidationError> {
    price
        .to_f64()
        .filter(|value| value.is_finite())
        .and_then(|value| Decimal::from_str(&value.to_string()).ok())
        .ok_or(ValidationError::invalid("price", "out of range"))
}

fn coerce_stock(value: &Value) -> Result<u32, ValidationError> {
    const REASON: &str = "expected a non-negative integer";

    let stock = match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|stock| u32::try_from(stock).ok())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64).and_then(whole)),
        Value::String(s) => {
            let text = s.trim();
            text.parse::<u32>()
                .ok()
                .or_else(|| Decimal::from_str(text).ok().and_then(whole))
        }
        _ => None,
    };
    stock.ok_or(ValidationError::invalid("stock", REASON))
}

fn whole(value: Decimal) -> Option<u32> {
    if value.fract().is_zero() {
        value.to_u32()
    } else {
        None
    }
}

fn coerce_status(value: &Value) -> Result<bool, ValidationError> {
    const REASON: &str = "expected a boolean";

    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ValidationError::invalid("status", REASON)),
        },
        Value::Number(n) => n
            .as_f64()
            .map(|n| n != 0.0)
            .ok_or(ValidationError::invalid("status", REASON)),
        _ => Err(ValidationError::invalid("status", REASON)),
    }
}

fn coerce_thumbnails(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}
