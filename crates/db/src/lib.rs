//! Database layer: SQLite pool setup, migrations, row models, repositories.

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// A single connection, or a transaction dereferenced to one.
pub type DbConnection = sqlx::SqliteConnection;

pub type DbTransaction = sqlx::Transaction<'static, sqlx::Sqlite>;

static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// How long a connection waits on SQLite's write lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a connection pool from a database URL (e.g. `sqlite://balcao.db`).
///
/// The database file is created if missing. Connections run in WAL mode
/// with foreign keys enforced.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

/// Begin a transaction that takes SQLite's write lock up front.
///
/// A deferred transaction that reads before it writes cannot wait for the
/// lock: in WAL mode the upgrade fails with `SQLITE_BUSY` as soon as another
/// connection has written. `BEGIN IMMEDIATE` queues on `busy_timeout`
/// instead, so every read-modify-write runs against the latest commit.
pub async fn begin_write(pool: &DbPool) -> Result<DbTransaction, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Number of embedded migrations the database has not successfully applied.
pub async fn pending_migrations(pool: &DbPool) -> Result<usize, sqlx::Error> {
    let applied: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
    Ok(MIGRATOR
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}

/// Verify the movement ledger can be read.
pub async fn ledger_health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM stock_movements LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(())
}
