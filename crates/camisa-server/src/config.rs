//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the catalog server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to bind to (0 for auto-assign).
    pub port: u16,
    /// Directory holding shirt images.
    pub media_root: PathBuf,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Seconds between pings to each client.
    pub heartbeat_interval_secs: u64,
    /// Seconds of client silence before a connection is considered dead.
    pub heartbeat_timeout_secs: u64,
    /// Maximum request body size in bytes, which bounds uploads.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            media_root: PathBuf::from("shirt-images"),
            max_connections: 50,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_upload_bytes: 16 * 1024 * 1024, // 16 MB
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
