//! # camisa-server
//!
//! Axum HTTP + `WebSocket` server for the shirt catalog.
//!
//! - REST endpoints: person and shirt CRUD, image serving, media listing
//! - `WebSocket` hub: connection registry, broadcast fan-out, heartbeat
//! - `shirt-modification` notifications after successful shirt mutations
//! - Prometheus metrics and a health endpoint
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod media;
pub mod metrics;
pub mod notify;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ApiError;
pub use media::{MediaError, MediaStore};
pub use server::{AppState, CatalogServer};
pub use shutdown::ShutdownCoordinator;
