/// Data-access collaborators
///
/// The business logic in [`crate::auth`] and [`crate::checkout`] never talks to
/// the database directly. It goes through these traits, which have two
/// implementations:
///
/// - [`postgres::PgStore`]: sqlx over a PostgreSQL pool
/// - [`memory::MemoryStore`]: mutex-guarded maps, used by tests and local runs
///
/// [`OrderStore::insert_order`] is the single atomic write of the system: the
/// order header and all its line items are stored together or not at all.
///
/// # Example
///
/// ```
/// use ecom_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// assert!(store.find_user(1).await?.is_none());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{
    address::{Address, CreateAddress},
    order::{NewOrder, Order},
    product::{CreateProduct, Product, UpdateProduct},
    user::{CreateUser, User},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness, referential or check constraint rejected the write
    #[error("Conflict on {constraint}: {message}")]
    Conflict {
        /// Name of the violated constraint, as declared in the schema
        constraint: String,

        message: String,
    },

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Store-internal failure
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Unique constraint on `users.email`
pub const USERS_EMAIL_KEY: &str = "users_email_key";

impl StoreError {
    pub fn conflict(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Conflict {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Whether this is a conflict on the named constraint
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, StoreError::Conflict { constraint, .. } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let fallback = if db_err.is_unique_violation() {
                Some("unique")
            } else if db_err.is_foreign_key_violation() {
                Some("foreign_key")
            } else if db_err.is_check_violation() {
                Some("check")
            } else {
                None
            };

            if let Some(fallback) = fallback {
                let constraint = db_err.constraint().unwrap_or(fallback);
                return StoreError::conflict(constraint, db_err.message());
            }
        }

        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// User lookup and persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by ID
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// Finds a user by email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Creates a user. A duplicate email is a `Conflict`.
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Deletes a user together with their addresses and orders
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

/// Address lookup and persistence
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Finds an address by ID
    async fn find_address(&self, id: i64) -> StoreResult<Option<Address>>;

    /// Creates an address owned by `user_id`
    async fn create_address(&self, user_id: i64, data: CreateAddress) -> StoreResult<Address>;
}

/// Product lookup and persistence
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Finds a product by ID
    async fn find_product(&self, id: i64) -> StoreResult<Option<Product>>;

    /// Creates a product
    async fn create_product(&self, data: CreateProduct) -> StoreResult<Product>;

    /// Applies a partial update, `None` if the product doesn't exist
    async fn update_product(&self, id: i64, data: UpdateProduct) -> StoreResult<Option<Product>>;

    /// Deletes a product. A product still referenced by an order line is a `Conflict`.
    async fn delete_product(&self, id: i64) -> StoreResult<bool>;
}

/// Order lookup and the atomic order write
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Finds an order with its line items
    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>>;

    /// Persists an order and all its line items atomically
    async fn insert_order(&self, data: NewOrder) -> StoreResult<Order>;
}

/// Complete data-access layer
#[async_trait]
pub trait Store: UserStore + AddressStore + ProductStore + OrderStore {
    /// Checks that the backing storage is reachable
    async fn ping(&self) -> StoreResult<()>;
}
