//! `SQLite` connection pooling.
//!
//! Every connection handed out by the pool has WAL journaling, a busy
//! timeout, and foreign-key enforcement applied via an `r2d2` connection
//! customizer, so repositories never have to think about pragmas.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// The pool type used throughout the store.
pub type StorePool = Pool<SqliteConnectionManager>;

/// A connection checked out of the pool.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool sizing and timeout knobs.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum pool size.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug)]
struct Pragmas {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for Pragmas {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))
    }
}

fn build(manager: SqliteConnectionManager, size: u32, busy_timeout_ms: u32) -> Result<StorePool> {
    let pool = Pool::builder()
        .max_size(size)
        .connection_timeout(std::time::Duration::from_secs(5))
        .connection_customizer(Box::new(Pragmas { busy_timeout_ms }))
        .build(manager)?;
    Ok(pool)
}

/// Open a file-backed pool at `path`.
pub fn open_file(path: impl AsRef<std::path::Path>, config: &PoolConfig) -> Result<StorePool> {
    build(
        SqliteConnectionManager::file(path),
        config.pool_size,
        config.busy_timeout_ms,
    )
}

/// Open an in-memory pool (for tests).
///
/// Capped at a single connection: each `:memory:` connection is its own
/// database, so a wider pool would hand out empty databases.
pub fn open_in_memory(config: &PoolConfig) -> Result<StorePool> {
    build(SqliteConnectionManager::memory(), 1, config.busy_timeout_ms)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
