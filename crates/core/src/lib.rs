//! Emporium Core - Shared domain types.
//!
//! This crate provides the domain model used across all Emporium components:
//! - `storefront` - JSON API, server-rendered views and storage backends
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Storage backends load and persist these types; everything
//! that decides *what* a collection should look like after an operation lives
//! here so it behaves identically on every backend.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, products, carts, validation and pagination

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
