//! Broadcast hub: fan-out of notifications to every open connection.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::metrics::WS_BROADCAST_DROPS_TOTAL;

use super::connection::Connection;
use super::errors::HubError;
use super::registry::ConnectionRegistry;

/// Owns the connection registry and pushes messages to its members.
///
/// One hub is constructed at startup and handed to handlers through router
/// state; there is no global instance.
pub struct BroadcastHub {
    registry: ConnectionRegistry,
}

impl BroadcastHub {
    /// Create a hub with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    /// Register a connection for future broadcasts.
    pub async fn register(&self, connection: Arc<Connection>) -> Result<(), HubError> {
        self.registry.add(connection).await
    }

    /// Remove a connection. Safe to call for connections already gone.
    pub async fn unregister(&self, connection_id: &str) -> bool {
        self.registry.remove(connection_id).await
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.len().await
    }

    /// Send `message` to every registered connection.
    ///
    /// Fire-and-forget: an empty registry is a silent no-op, and a failed
    /// send evicts that one connection without disturbing the rest of the
    /// fan-out. Works over a snapshot, so connections may come and go while
    /// the loop runs. Returns the number of successful deliveries.
    pub async fn broadcast(&self, message: &str) -> usize {
        let targets = self.registry.snapshot().await;
        if targets.is_empty() {
            debug!("broadcast with no connections, skipping");
            return 0;
        }

        let payload = Arc::new(message.to_owned());
        let mut delivered = 0usize;
        let mut stale: Vec<String> = Vec::new();
        for connection in &targets {
            match connection.send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(connection_id = %connection.id, error = %err, "send failed, evicting connection");
                    counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                    stale.push(connection.id.clone());
                }
            }
        }
        for id in &stale {
            let _ = self.registry.remove(id).await;
        }

        debug!(recipients = targets.len(), delivered, "broadcast complete");
        delivered
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
