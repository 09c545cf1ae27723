/// Database layer for the storefront
///
/// Connection pooling and schema migrations for PostgreSQL. The SQL for each
/// table lives with its model in [`crate::models`].
///
/// # Example
///
/// ```no_run
/// use ecom_shared::db::{connect, run_migrations, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = connect(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

pub use migrations::{ensure_database_exists, run_migrations};
pub use pool::{close, connect, health_check, DatabaseConfig};
