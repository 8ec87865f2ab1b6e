//! Emporium storefront library.
//!
//! Product and cart collections behind a JSON API, a few server-rendered
//! pages and a live product event stream. The storage backend (JSON files or
//! `PostgreSQL` documents) is chosen once at startup; everything above it is
//! backend-agnostic.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod middleware;
pub mod routes;
pub mod state;
