//! # camisa-store
//!
//! `SQLite` persistence for the shirt catalog: an r2d2 connection pool with
//! WAL and foreign keys enforced, an embedded idempotent migration runner,
//! and stateless repositories for people and shirts composed behind the
//! [`CatalogStore`] facade.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod people;
pub mod shirts;
pub mod store;

pub use connection::{PoolConfig, PooledConnection, StorePool, open_file, open_in_memory};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use people::PersonRepo;
pub use shirts::ShirtRepo;
pub use store::CatalogStore;
