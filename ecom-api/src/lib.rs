//! # Ecom API Server Library
//!
//! HTTP surface of the storefront backend.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and auth layers
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
