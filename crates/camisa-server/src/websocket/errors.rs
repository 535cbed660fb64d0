//! Error taxonomy for the connection hub.
//!
//! None of these failures are fatal to the service: a broken real-time layer
//! degrades the server to plain REST, it never takes a request down with it.

use thiserror::Error;

/// Failures raised by the hub, the registry, and the upgrade endpoint.
#[derive(Debug, Error)]
pub enum HubError {
    /// Registration was attempted with a handle that is no longer usable.
    #[error("invalid connection handle: {id}")]
    InvalidConnection {
        /// Identifier of the rejected connection.
        id: String,
    },

    /// A send to one connection failed.
    ///
    /// Contained inside the broadcast loop; it marks the connection for
    /// removal and never aborts the fan-out.
    #[error("send to connection {id} failed")]
    SendFailure {
        /// Identifier of the connection that could not be reached.
        id: String,
    },

    /// The WebSocket handshake failed or was refused.
    #[error("websocket upgrade failed: {reason}")]
    UpgradeFailure {
        /// Why the upgrade did not complete.
        reason: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
