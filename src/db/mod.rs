/// Database layer for the career portal
///
/// Manages the SQLite connection pool and embedded migrations, and maps
/// constraint violations onto portal errors.

pub mod account;

use crate::error::{PortalError, PortalResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> PortalResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    SqliteJournalMode::Wal
                } else {
                    SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await?;

    Ok(pool)
}

/// Single-connection in-memory pool with migrations applied.
///
/// Every connection to `:memory:` is its own database, so the pool is pinned
/// to one connection that never expires.
pub async fn memory_pool() -> PortalResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(
            SqliteConnectOptions::new()
                .in_memory(true)
                .foreign_keys(true),
        )
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run migrations for a database
/// Migrations are embedded at compile time from ./migrations directory
pub async fn run_migrations(pool: &SqlitePool) -> PortalResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> PortalResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Map a UNIQUE constraint failure to a duplicate-record error; pass anything else through
pub fn map_unique_violation(err: sqlx::Error) -> PortalError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let message = db_err.message();
            let field = if message.contains("mobile_number") {
                "Mobile number already registered"
            } else if message.contains("email") {
                "Email already registered"
            } else {
                "Record already exists"
            };
            PortalError::Duplicate(field.to_string())
        }
        _ => PortalError::Database(err),
    }
}
