/// Schema migrations
///
/// Migration files live in `migrations/` at the workspace root and are
/// embedded into the binary at compile time.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails to apply. The failing migration is
/// rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("../migrations")
        .run(pool)
        .await
        .inspect_err(|e| warn!(error = %e, "Migration failed"))?;

    info!("Database schema is up to date");
    Ok(())
}

/// Creates the database named in `database_url` when it's missing
///
/// Meant for local development. Production databases are provisioned
/// separately.
///
/// # Errors
///
/// Returns an error if the server is unreachable or the role may not create
/// databases.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
        return Ok(());
    }

    info!("Database does not exist, creating it");
    Postgres::create_database(database_url).await?;
    Ok(())
}
