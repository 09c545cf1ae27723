/// Order and order line models
///
/// An order owns its line items: they are written in the same transaction as
/// the order header and deleted with it (`ON DELETE CASCADE`). Line items
/// snapshot the unit price at purchase time, so later catalogue price changes
/// never alter an existing order.
///
/// # Status
///
/// ```text
/// pending → processing → shipped → delivered
///        ↘ cancelled
/// ```
///
/// Every order starts out `pending`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE order_status AS ENUM (
///     'pending', 'processing', 'shipped', 'delivered', 'cancelled'
/// );
///
/// CREATE TABLE orders (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     shipping_address_id BIGINT NOT NULL REFERENCES addresses(id),
///     billing_address_id BIGINT NOT NULL REFERENCES addresses(id),
///     order_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     total_amount DOUBLE PRECISION NOT NULL,
///     status order_status NOT NULL DEFAULT 'pending'
/// );
///
/// CREATE TABLE order_details (
///     id BIGSERIAL PRIMARY KEY,
///     order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
///     product_id BIGINT NOT NULL REFERENCES products(id) ON DELETE RESTRICT,
///     position INTEGER NOT NULL,
///     quantity INTEGER NOT NULL CHECK (quantity > 0),
///     price_at_purchase DOUBLE PRECISION NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (order_id, position)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

/// Order fulfilment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet processed
    #[default]
    Pending,

    Processing,

    Shipped,

    Delivered,

    Cancelled,
}

impl OrderStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Order header with its line items, in placement order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,

    /// Ordering user
    pub user_id: i64,

    pub shipping_address_id: i64,

    pub billing_address_id: i64,

    pub order_date: DateTime<Utc>,

    /// Sum of `price_at_purchase * quantity` over all line items
    pub total_amount: f64,

    pub status: OrderStatus,

    pub details: Vec<OrderDetail>,
}

/// Line item snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderDetail {
    pub id: i64,

    /// Owning order
    pub order_id: i64,

    pub product_id: i64,

    /// Always positive
    pub quantity: i32,

    /// Unit price captured when the order was placed
    pub price_at_purchase: f64,

    pub created_at: DateTime<Utc>,
}

/// Order ready to be persisted, ids and timestamps not yet assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,

    pub shipping_address_id: i64,

    pub billing_address_id: i64,

    pub total_amount: f64,

    pub status: OrderStatus,

    /// Line items in the order they must be stored
    pub details: Vec<NewOrderDetail>,
}

/// Line item ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderDetail {
    pub product_id: i64,

    pub quantity: i32,

    pub price_at_purchase: f64,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    shipping_address_id: i64,
    billing_address_id: i64,
    order_date: DateTime<Utc>,
    total_amount: f64,
    status: OrderStatus,
}

impl OrderRow {
    fn with_details(self, details: Vec<OrderDetail>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            shipping_address_id: self.shipping_address_id,
            billing_address_id: self.billing_address_id,
            order_date: self.order_date,
            total_amount: self.total_amount,
            status: self.status,
            details,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, shipping_address_id, billing_address_id, order_date, total_amount, status";

const DETAIL_COLUMNS: &str = "id, order_id, product_id, quantity, price_at_purchase, created_at";

impl Order {
    /// Inserts the order header and all its line items in one transaction
    ///
    /// Either every row is committed or none is. A foreign key race (for
    /// example a product deleted after it was read) rolls the whole write back.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails or the commit fails
    pub async fn create_with_details(pool: &PgPool, data: NewOrder) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO orders (user_id, shipping_address_id, billing_address_id, total_amount, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let header = sqlx::query_as::<_, OrderRow>(&query)
            .bind(data.user_id)
            .bind(data.shipping_address_id)
            .bind(data.billing_address_id)
            .bind(data.total_amount)
            .bind(data.status)
            .fetch_one(&mut *tx)
            .await?;

        let detail_query = format!(
            r#"
            INSERT INTO order_details (order_id, product_id, position, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {DETAIL_COLUMNS}
            "#
        );

        let mut details = Vec::with_capacity(data.details.len());
        for (position, line) in data.details.into_iter().enumerate() {
            let detail = sqlx::query_as::<_, OrderDetail>(&detail_query)
                .bind(header.id)
                .bind(line.product_id)
                .bind(position as i32)
                .bind(line.quantity)
                .bind(line.price_at_purchase)
                .fetch_one(&mut *tx)
                .await?;
            details.push(detail);
        }

        tx.commit().await?;

        debug!(order_id = header.id, lines = details.len(), "Order committed");
        Ok(header.with_details(details))
    }

    /// Finds an order by ID, including its line items in placement order
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        let Some(header) = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let detail_query = format!(
            "SELECT {DETAIL_COLUMNS} FROM order_details WHERE order_id = $1 ORDER BY position"
        );

        let details = sqlx::query_as::<_, OrderDetail>(&detail_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(header.with_details(details)))
    }
}
