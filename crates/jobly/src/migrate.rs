//! Schema migrations via [`refinery`].
//!
//! The `companies` and `jobs` tables live in `migrations/` and are embedded
//! into the binary at compile time.
//!
//! # Example
//!
//! ```ignore
//! let pool = jobly::create_pool_with_config(&DatabaseConfig::from_env()?)?;
//! let report = jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::JoblyResult;

pub use refinery::{Migration, Report, Runner};

mod embedded {
    refinery::embed_migrations!("./migrations");
}

/// Runner for the embedded migrations.
pub fn runner() -> Runner {
    embedded::migrations::runner()
}

/// Embedded migrations in version order.
pub fn embedded_migrations() -> Vec<Migration> {
    runner().get_migrations().to_vec()
}

/// Run pending migrations on a single PostgreSQL connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = runner().run_async(client).await?;
    for migration in report.applied_migrations() {
        tracing::info!(
            target: "jobly.migrate",
            version = migration.version(),
            name = migration.name(),
            "applied migration"
        );
    }
    Ok(report)
}

/// Acquire a connection from a pool and run pending migrations on it.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    let client: &mut tokio_postgres::Client = &mut client;
    run(client).await
}
