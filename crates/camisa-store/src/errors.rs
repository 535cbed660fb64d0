//! Error types for the catalog store.
//!
//! [`StoreError`] covers every failure a store operation can surface. Rows
//! that simply do not exist are reported as `Ok(None)` by the repositories,
//! not as errors.

use thiserror::Error;

/// Errors returned by catalog store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },
}

impl StoreError {
    /// True when the underlying failure is a `SQLite` constraint violation
    /// (foreign key, unique, check). Callers use this to turn referential
    /// failures into client errors instead of server errors.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
