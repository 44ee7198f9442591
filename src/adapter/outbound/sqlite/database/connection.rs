//! Pooled SQLite connections and embedded migrations.
//!
//! Every connection handed out by [`create_pool`] has its pragmas applied on
//! checkout, so callers never configure connections themselves.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result, SinkError};

/// Record table migrations, compiled in from `migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connections the pool keeps open. One flush uses one connection.
const POOL_SIZE: u32 = 4;

/// Pragmas applied to every checked-out connection.
const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build a pool for `database_url` (a file path or `:memory:`).
///
/// # Errors
/// Returns an error if the first connection cannot be opened.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    build_pool(database_url, POOL_SIZE)
}

fn build_pool(database_url: &str, size: u32) -> Result<DbPool> {
    Pool::builder()
        .max_size(size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
        .map_err(|e| Error::Connection(format!("sqlite pool for {database_url}: {e}")))
}

/// Apply pending migrations. The first one seeds the draw into
/// `runner_names`.
///
/// # Errors
/// Returns an error if a connection is unavailable or a migration fails.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .map_err(|e| SinkError::Database(e.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| SinkError::Database(format!("migration failed: {e}")))?;
    if !applied.is_empty() {
        tracing::info!(applied = applied.len(), "SQLite migrations applied");
    }
    Ok(())
}
