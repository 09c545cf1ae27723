/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Password login issuing bearer tokens
/// - `users`: Registration and profile lookup
/// - `admin`: User management for administrators
/// - `products`: Catalogue reads and admin writes
/// - `addresses`: Addresses owned by the caller
/// - `orders`: Order placement and lookup

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;
