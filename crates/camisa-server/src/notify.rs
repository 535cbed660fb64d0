//! Catalog change notifications.

use std::sync::Arc;

use metrics::counter;
use tracing::debug;

use crate::metrics::CATALOG_MUTATIONS_TOTAL;
use crate::websocket::hub::BroadcastHub;

/// Payload pushed to every connected client after a successful shirt
/// mutation. It carries no data; clients treat it as a cue to re-fetch.
pub const SHIRT_MODIFICATION: &str = "shirt-modification";

/// Announces catalog changes over the broadcast hub.
///
/// Handlers call this only after persistence succeeds; a failed mutation
/// never notifies. Person mutations are deliberately silent.
pub struct ChangeNotifier {
    hub: Arc<BroadcastHub>,
}

impl ChangeNotifier {
    /// Create a notifier around the shared hub.
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }

    /// Announce that shirt data changed. Fire-and-forget.
    pub async fn shirt_modified(&self) {
        counter!(CATALOG_MUTATIONS_TOTAL).increment(1);
        let delivered = self.hub.broadcast(SHIRT_MODIFICATION).await;
        debug!(delivered, "shirt modification announced");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::connection::Connection;
    use tokio::sync::mpsc;

    #[test]
    fn payload_is_the_expected_literal() {
        assert_eq!(SHIRT_MODIFICATION, "shirt-modification");
    }

    #[tokio::test]
    async fn notify_with_no_clients_is_a_noop() {
        let notifier = ChangeNotifier::new(Arc::new(BroadcastHub::new()));
        notifier.shirt_modified().await;
    }

    #[tokio::test]
    async fn each_client_receives_exactly_one_message() {
        let hub = Arc::new(BroadcastHub::new());
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(Arc::new(Connection::new("conn_1".to_string(), tx)))
            .await
            .unwrap();

        let notifier = ChangeNotifier::new(hub);
        notifier.shirt_modified().await;

        assert_eq!(*rx.recv().await.unwrap(), "shirt-modification");
        assert!(rx.try_recv().is_err());
    }
}
