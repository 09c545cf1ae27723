/// PostgreSQL implementation of the store traits
///
/// Delegates to the SQL operations on each model.
///
/// # Example
///
/// ```no_run
/// use ecom_shared::db::{connect, DatabaseConfig};
/// use ecom_shared::store::{postgres::PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = connect(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;

use super::{AddressStore, OrderStore, ProductStore, Store, StoreResult, UserStore};
use crate::db;
use crate::models::{
    address::{Address, CreateAddress},
    order::{NewOrder, Order},
    product::{CreateProduct, Product, UpdateProduct},
    user::{CreateUser, User},
};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl AddressStore for PgStore {
    async fn find_address(&self, id: i64) -> StoreResult<Option<Address>> {
        Ok(Address::find_by_id(&self.pool, id).await?)
    }

    async fn create_address(&self, user_id: i64, data: CreateAddress) -> StoreResult<Address> {
        Ok(Address::create(&self.pool, user_id, data).await?)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(Product::find_by_id(&self.pool, id).await?)
    }

    async fn create_product(&self, data: CreateProduct) -> StoreResult<Product> {
        Ok(Product::create(&self.pool, data).await?)
    }

    async fn update_product(&self, id: i64, data: UpdateProduct) -> StoreResult<Option<Product>> {
        Ok(Product::update(&self.pool, id, data).await?)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        Ok(Product::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(Order::find_by_id(&self.pool, id).await?)
    }

    async fn insert_order(&self, data: NewOrder) -> StoreResult<Order> {
        Ok(Order::create_with_details(&self.pool, data).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(db::health_check(&self.pool).await?)
    }
}
