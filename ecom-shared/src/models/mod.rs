/// Database models for the storefront
///
/// Each model carries its own SQL operations against a `PgPool`. Business
/// logic talks to them through the traits in [`crate::store`].
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `address`: Postal addresses owned by users
/// - `product`: Catalogue entries
/// - `order`: Orders and their line items

pub mod address;
pub mod order;
pub mod product;
pub mod user;
