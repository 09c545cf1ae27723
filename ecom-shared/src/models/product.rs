/// Product model and database operations
///
/// Products are the catalogue entries customers order. Only administrators
/// create, update or delete them; the HTTP layer enforces that.
///
/// # Pricing
///
/// A product has a list `price` and an optional `discount_price`. When the
/// discount is present it is the price a customer pays (see
/// [`Product::unit_price`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id BIGSERIAL PRIMARY KEY,
///     category_name VARCHAR(255) NOT NULL,
///     subcategory_name VARCHAR(255),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     brand VARCHAR(255),
///     price DOUBLE PRECISION NOT NULL,
///     discount_price DOUBLE PRECISION,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,

    pub category_name: String,

    pub subcategory_name: Option<String>,

    pub name: String,

    pub description: String,

    pub brand: Option<String>,

    /// List price
    pub price: f64,

    /// Price charged instead of the list price, when set
    pub discount_price: Option<f64>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Price a customer pays for one unit right now
    pub fn unit_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub category_name: String,

    pub subcategory_name: Option<String>,

    pub name: String,

    pub description: String,

    pub brand: Option<String>,

    pub price: f64,

    pub discount_price: Option<f64>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial product update
///
/// Only `Some` fields are written. Nullable columns use a nested option:
/// `Some(None)` clears the value, `None` leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub category_name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub subcategory_name: Option<Option<String>>,

    pub name: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub brand: Option<Option<String>>,

    pub price: Option<f64>,

    #[serde(default, deserialize_with = "double_option")]
    pub discount_price: Option<Option<f64>>,

    pub is_active: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent field
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProduct {
    /// Applies the present fields to an in-memory product
    pub fn apply_to(self, product: &mut Product) {
        if let Some(category_name) = self.category_name {
            product.category_name = category_name;
        }
        if let Some(subcategory_name) = self.subcategory_name {
            product.subcategory_name = subcategory_name;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(brand) = self.brand {
            product.brand = brand;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(discount_price) = self.discount_price {
            product.discount_price = discount_price;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
        product.updated_at = Some(Utc::now());
    }
}

const PRODUCT_COLUMNS: &str = "id, category_name, subcategory_name, name, description, brand, \
     price, discount_price, is_active, created_at, updated_at";

impl Product {
    /// Creates a new product
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO products (category_name, subcategory_name, name, description, brand,
                                  price, discount_price, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(data.category_name)
            .bind(data.subcategory_name)
            .bind(data.name)
            .bind(data.description)
            .bind(data.brand)
            .bind(data.price)
            .bind(data.discount_price)
            .bind(data.is_active)
            .fetch_one(pool)
            .await
    }

    /// Finds a product by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Updates the present fields of a product
    ///
    /// Returns `None` if the product doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE products SET updated_at = NOW()");

        if let Some(category_name) = data.category_name {
            builder.push(", category_name = ").push_bind(category_name);
        }
        if let Some(subcategory_name) = data.subcategory_name {
            builder.push(", subcategory_name = ").push_bind(subcategory_name);
        }
        if let Some(name) = data.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = data.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(brand) = data.brand {
            builder.push(", brand = ").push_bind(brand);
        }
        if let Some(price) = data.price {
            builder.push(", price = ").push_bind(price);
        }
        if let Some(discount_price) = data.discount_price {
            builder.push(", discount_price = ").push_bind(discount_price);
        }
        if let Some(is_active) = data.is_active {
            builder.push(", is_active = ").push_bind(is_active);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(PRODUCT_COLUMNS);

        builder.build_query_as::<Product>().fetch_optional(pool).await
    }

    /// Deletes a product by ID
    ///
    /// Returns true if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if an order line still references the
    /// product, or an error if the database connection fails.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
