/// Database migration runner
///
/// Migrations live in the `migrations/` directory of this crate and are
/// embedded into the binary at compile time via [`sqlx::migrate!`], so a
/// deployed server carries its own schema. Files follow sqlx's
/// `{timestamp}_{name}.sql` naming.
///
/// # Example
///
/// ```no_run
/// use taskforge_shared::db::migrations::run_migrations;
/// use taskforge_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Safe to call on every startup: already-applied migrations are skipped,
/// and concurrent runners serialize on sqlx's advisory lock.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or the connection is
/// lost mid-run; the failing migration is rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
