//! Ping/pong liveness tracking.

use std::time::Duration;

use super::connection::Connection;

/// Verdict of one heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// The connection looks healthy; send the next ping.
    Ping,
    /// The client has been silent past the timeout; close the connection.
    Dead,
}

/// Evaluates client liveness once per ping interval.
///
/// The session's writer task calls [`Heartbeat::beat`] on every tick: each
/// call consumes the connection's alive flag (re-armed by any pong), and a
/// connection is declared dead only when the flag is down *and* the last
/// signal is older than the timeout. A client that answers even one ping in
/// the window stays alive.
pub struct Heartbeat {
    timeout: Duration,
}

impl Heartbeat {
    /// Create a heartbeat with the configured silence timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Judge the connection for this tick.
    pub fn beat(&self, connection: &Connection) -> Beat {
        if !connection.check_alive() && connection.last_pong_elapsed() > self.timeout {
            Beat::Dead
        } else {
            Beat::Ping
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
