//! State for one live client connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::errors::HubError;

/// Handle to one connected client.
///
/// The registry owns one `Arc` per open connection; the session task keeps
/// another for liveness updates and teardown. All sends go through a bounded
/// channel to the session's writer task, so nothing here ever blocks.
pub struct Connection {
    /// Unique connection identifier.
    pub id: String,
    /// Channel to the connection's writer task.
    tx: mpsc::Sender<Arc<String>>,
    /// When the connection was established.
    pub connected_at: Instant,
    /// Set once the session leaves its open phase.
    closed: AtomicBool,
    /// Whether the client has answered since the last heartbeat tick.
    is_alive: AtomicBool,
    /// When the last pong (or ping) arrived from the client.
    last_pong: Mutex<Instant>,
}

impl Connection {
    /// Create an open connection around the sending half of its channel.
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            closed: AtomicBool::new(false),
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
        }
    }

    /// Whether the connection can still accept sends.
    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Relaxed) && !self.tx.is_closed()
    }

    /// Mark the connection closed. Subsequent sends fail.
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    /// Queue a text message without blocking.
    ///
    /// A closed connection, a dropped writer task, and a full channel all
    /// report the same [`HubError::SendFailure`].
    pub fn send(&self, message: Arc<String>) -> Result<(), HubError> {
        if !self.is_open() {
            return Err(HubError::SendFailure {
                id: self.id.clone(),
            });
        }
        self.tx.try_send(message).map_err(|_| HubError::SendFailure {
            id: self.id.clone(),
        })
    }

    /// Record a liveness signal from the client.
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Consume the alive flag. Returns whether the client answered since the
    /// previous check and arms the next one.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the last liveness signal (or since connect).
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// How long the connection has existed.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection(id: &str, capacity: usize) -> (Connection, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Connection::new(id.to_string(), tx), rx)
    }

    #[test]
    fn new_connection_is_open_and_alive() {
        let (conn, _rx) = make_connection("conn_1", 8);
        assert_eq!(conn.id, "conn_1");
        assert!(conn.is_open());
        assert!(conn.check_alive());
    }

    #[tokio::test]
    async fn send_delivers_to_channel() {
        let (conn, mut rx) = make_connection("conn_1", 8);
        conn.send(Arc::new("hello".to_string())).unwrap();
        let got = rx.recv().await.unwrap();
        assert_eq!(*got, "hello");
    }

    #[tokio::test]
    async fn send_to_dropped_receiver_fails() {
        let (conn, rx) = make_connection("conn_1", 8);
        drop(rx);
        let err = conn.send(Arc::new("hello".to_string())).unwrap_err();
        assert!(matches!(err, HubError::SendFailure { id } if id == "conn_1"));
    }

    #[tokio::test]
    async fn send_to_full_channel_fails() {
        let (conn, _rx) = make_connection("conn_1", 1);
        conn.send(Arc::new("first".to_string())).unwrap();
        assert!(conn.send(Arc::new("second".to_string())).is_err());
    }

    #[test]
    fn mark_closed_stops_sends() {
        let (conn, _rx) = make_connection("conn_1", 8);
        conn.mark_closed();
        assert!(!conn.is_open());
        assert!(conn.send(Arc::new("late".to_string())).is_err());
    }

    #[test]
    fn check_alive_consumes_the_flag() {
        let (conn, _rx) = make_connection("conn_1", 8);
        assert!(conn.check_alive());
        assert!(!conn.check_alive());
        conn.mark_alive();
        assert!(conn.check_alive());
    }

    #[test]
    fn mark_alive_resets_pong_clock() {
        let (conn, _rx) = make_connection("conn_1", 8);
        std::thread::sleep(Duration::from_millis(15));
        conn.mark_alive();
        assert!(conn.last_pong_elapsed() < Duration::from_millis(15));
    }

    #[test]
    fn age_grows() {
        let (conn, _rx) = make_connection("conn_1", 8);
        std::thread::sleep(Duration::from_millis(5));
        assert!(conn.age() >= Duration::from_millis(5));
    }
}
