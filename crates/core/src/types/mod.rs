//! Core types for Emporium.
//!
//! This module provides the documents stored in each collection and the
//! pure operations over them.

pub mod cart;
pub mod document;
pub mod error;
pub mod id;
pub mod product;
pub mod query;

pub use cart::{Cart, CartItem, PopulatedCart, PopulatedItem};
pub use document::Document;
pub use error::ValidationError;
pub use id::*;
pub use product::{Fields, NewProduct, Product, ProductPatch, REQUIRED_FIELDS};
pub use query::{DEFAULT_LIMIT, DEFAULT_PAGE, Page, ProductFilter, ProductQuery, SortOrder};
