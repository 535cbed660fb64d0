//! Tracked set of open connections.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::connection::Connection;
use super::errors::HubError;

/// The currently-open connections, keyed by connection ID.
///
/// Every operation synchronizes internally, so callers may add, remove, and
/// snapshot from any number of tasks at once. Nothing holds the lock while
/// talking to a connection.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection.
    ///
    /// A handle that can no longer accept sends is rejected with
    /// [`HubError::InvalidConnection`]. Registering an ID twice replaces the
    /// earlier entry.
    pub async fn add(&self, connection: Arc<Connection>) -> Result<(), HubError> {
        if !connection.is_open() {
            return Err(HubError::InvalidConnection {
                id: connection.id.clone(),
            });
        }
        let mut conns = self.connections.write().await;
        let _ = conns.insert(connection.id.clone(), connection);
        Ok(())
    }

    /// Remove a connection by ID.
    ///
    /// Returns whether it was present; removing an absent ID is a no-op.
    pub async fn remove(&self, connection_id: &str) -> bool {
        let mut conns = self.connections.write().await;
        conns.remove(connection_id).is_some()
    }

    /// Point-in-time copy of the registered connections.
    ///
    /// Iterating the snapshot holds no lock, so a slow consumer never stalls
    /// concurrent adds and removes.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
