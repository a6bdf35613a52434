/// Database layer for Gavel
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
/// - `integrity`: Declared ON DELETE policy for every foreign key
///
/// Models live in the `models` module at crate root level.
///
/// # Example
///
/// ```no_run
/// use gavel_shared::db::pool::{create_pool, PoolSettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = PoolSettings {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(settings).await?;
///     gavel_shared::db::migrations::run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod integrity;
pub mod migrations;
pub mod pool;
