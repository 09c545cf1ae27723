/// Address model and database operations
///
/// Every address is owned by exactly one user. Orders reference addresses
/// for shipping and billing but never own them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE addresses (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     address_line1 VARCHAR(255) NOT NULL,
///     address_line2 VARCHAR(255),
///     city VARCHAR(255) NOT NULL,
///     state VARCHAR(255) NOT NULL,
///     country VARCHAR(255) NOT NULL DEFAULT 'India',
///     postal_code VARCHAR(32) NOT NULL,
///     is_default_shipping BOOLEAN NOT NULL DEFAULT FALSE,
///     is_default_billing BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Postal address owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    pub address_line1: String,

    pub address_line2: Option<String>,

    pub city: String,

    pub state: String,

    pub country: String,

    pub postal_code: String,

    /// Advisory flag, several addresses of one user may carry it
    pub is_default_shipping: bool,

    /// Advisory flag, several addresses of one user may carry it
    pub is_default_billing: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating an address. The owner is supplied separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddress {
    pub address_line1: String,

    pub address_line2: Option<String>,

    pub city: String,

    pub state: String,

    #[serde(default = "default_country")]
    pub country: String,

    pub postal_code: String,

    #[serde(default)]
    pub is_default_shipping: bool,

    #[serde(default)]
    pub is_default_billing: bool,
}

/// Country used when none is given
pub fn default_country() -> String {
    "India".to_string()
}

const ADDRESS_COLUMNS: &str = "id, user_id, address_line1, address_line2, city, state, country, \
     postal_code, is_default_shipping, is_default_billing, created_at, updated_at";

impl Address {
    /// Creates an address owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key violation)
    /// or the database connection fails.
    pub async fn create(pool: &PgPool, user_id: i64, data: CreateAddress) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO addresses (user_id, address_line1, address_line2, city, state, country,
                                   postal_code, is_default_shipping, is_default_billing)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ADDRESS_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Address>(&query)
            .bind(user_id)
            .bind(data.address_line1)
            .bind(data.address_line2)
            .bind(data.city)
            .bind(data.state)
            .bind(data.country)
            .bind(data.postal_code)
            .bind(data.is_default_shipping)
            .bind(data.is_default_billing)
            .fetch_one(pool)
            .await
    }

    /// Finds an address by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1");

        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
