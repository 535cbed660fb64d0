//! Per-connection WebSocket session lifecycle.
//!
//! A session moves through an explicit state machine: it is registered with
//! the hub on upgrade, stays open while the transport and heartbeat hold,
//! and is removed from the hub on every path out. Clients receive nothing
//! on connect; the first bytes they see are the first broadcast.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
    WS_SESSION_DURATION_SECONDS,
};
use crate::server::AppState;
use crate::websocket::connection::Connection;
use crate::websocket::errors::HubError;
use crate::websocket::heartbeat::{Beat, Heartbeat};

/// Outbound channel capacity per connection.
///
/// Notification traffic is one short literal per catalog mutation; a client
/// this far behind is treated as dead by the hub.
const SEND_BUFFER: usize = 32;

/// Lifecycle phase of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Upgrade accepted, not yet registered with the hub.
    Connecting,
    /// Registered and receiving broadcasts.
    Open,
    /// Terminal: never registered, or registered and since removed.
    Closed,
}

/// Events that drive phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Registration with the hub succeeded.
    Registered,
    /// Registration was rejected; the attempt is abandoned.
    RegisterFailed,
    /// The client sent a close frame or ended the stream.
    PeerClosed,
    /// The transport errored mid-session.
    TransportError,
    /// The client stopped answering pings.
    HeartbeatTimeout,
    /// The server is shutting down.
    ShutdownRequested,
}

impl Phase {
    /// Transition table. `Closed` is terminal for every event.
    pub fn advance(self, event: SessionEvent) -> Phase {
        match (self, event) {
            (Phase::Connecting, SessionEvent::Registered) => Phase::Open,
            (Phase::Connecting, _) => Phase::Closed,
            // A repeat registration cannot change an open session.
            (Phase::Open, SessionEvent::Registered) => Phase::Open,
            (Phase::Open, _) | (Phase::Closed, _) => Phase::Closed,
        }
    }
}

/// GET /ws upgrade handler.
///
/// A malformed handshake is answered with the rejection's own response and
/// never reaches the hub; at connection capacity the upgrade is refused
/// with 503.
pub async fn ws_handler(
    State(state): State<AppState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            let err = HubError::UpgradeFailure {
                reason: rejection.to_string(),
            };
            warn!(error = %err, "upgrade rejected");
            return rejection.into_response();
        }
    };

    if state.hub.connection_count().await >= state.config.max_connections {
        let err = HubError::UpgradeFailure {
            reason: "connection capacity reached".into(),
        };
        warn!(max_connections = state.config.max_connections, error = %err, "refusing upgrade");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    upgrade.on_upgrade(move |socket| {
        let connection_id = format!("conn_{}", Uuid::now_v7());
        run_session(state, socket, connection_id)
    })
}

/// Drive one session from registration to teardown.
#[allow(clippy::too_many_lines)]
#[instrument(skip_all, fields(connection_id = %connection_id))]
async fn run_session(state: AppState, socket: WebSocket, connection_id: String) {
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(SEND_BUFFER);
    let connection = Arc::new(Connection::new(connection_id.clone(), send_tx));

    let mut phase = Phase::Connecting;
    match state.hub.register(connection.clone()).await {
        Ok(()) => {
            phase = phase.advance(SessionEvent::Registered);
            info!("client connected");
        }
        Err(err) => {
            // Never registered, so there is nothing to unregister.
            phase = phase.advance(SessionEvent::RegisterFailed);
            warn!(error = %err, "registration rejected, closing");
            let _ = ws_tx.send(Message::Close(None)).await;
            counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
            gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
            debug!(phase = ?phase, "session ended before open");
            return;
        }
    }

    // Writer task: forwards queued broadcasts and drives the heartbeat. The
    // reader below owns the session and watches this task for its verdict.
    let heartbeat = Heartbeat::new(Duration::from_secs(state.config.heartbeat_timeout_secs));
    let mut ping_interval =
        tokio::time::interval(Duration::from_secs(state.config.heartbeat_interval_secs));
    let writer_conn = connection.clone();
    let mut writer = tokio::spawn(async move {
        // The first interval tick fires immediately; consume it so the
        // first ping waits a full interval.
        let _ = ping_interval.tick().await;
        loop {
            tokio::select! {
                maybe = send_rx.recv() => match maybe {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                            break SessionEvent::TransportError;
                        }
                    }
                    None => break SessionEvent::TransportError,
                },
                _ = ping_interval.tick() => match heartbeat.beat(&writer_conn) {
                    Beat::Ping => {
                        if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                            break SessionEvent::TransportError;
                        }
                    }
                    Beat::Dead => {
                        warn!("client stopped answering pings, closing");
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break SessionEvent::HeartbeatTimeout;
                    }
                },
            }
        }
    });

    let shutdown = state.shutdown.token();
    let close_event = loop {
        tokio::select! {
            () = shutdown.cancelled() => break SessionEvent::ShutdownRequested,
            result = &mut writer => {
                break result.unwrap_or(SessionEvent::TransportError);
            }
            maybe = ws_rx.next() => match maybe {
                None => break SessionEvent::PeerClosed,
                Some(Err(err)) => {
                    debug!(error = %err, "transport error");
                    break SessionEvent::TransportError;
                }
                Some(Ok(Message::Close(_))) => break SessionEvent::PeerClosed,
                Some(Ok(Message::Pong(_) | Message::Ping(_))) => connection.mark_alive(),
                // Client payloads are not part of the notification contract.
                Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                    trace!("ignoring client frame");
                }
            },
        }
    };

    phase = phase.advance(close_event);
    connection.mark_closed();
    let _ = state.hub.unregister(&connection_id).await;
    if !writer.is_finished() {
        writer.abort();
    }

    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_SESSION_DURATION_SECONDS).record(connection.age().as_secs_f64());
    info!(event = ?close_event, phase = ?phase, duration_secs = connection.age().as_secs(), "client disconnected");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [SessionEvent; 6] = [
        SessionEvent::Registered,
        SessionEvent::RegisterFailed,
        SessionEvent::PeerClosed,
        SessionEvent::TransportError,
        SessionEvent::HeartbeatTimeout,
        SessionEvent::ShutdownRequested,
    ];

    #[test]
    fn registration_opens_the_session() {
        assert_eq!(
            Phase::Connecting.advance(SessionEvent::Registered),
            Phase::Open
        );
    }

    #[test]
    fn failed_registration_closes_without_opening() {
        assert_eq!(
            Phase::Connecting.advance(SessionEvent::RegisterFailed),
            Phase::Closed
        );
    }

    #[test]
    fn any_failure_while_connecting_closes() {
        for event in [
            SessionEvent::PeerClosed,
            SessionEvent::TransportError,
            SessionEvent::HeartbeatTimeout,
            SessionEvent::ShutdownRequested,
        ] {
            assert_eq!(Phase::Connecting.advance(event), Phase::Closed, "{event:?}");
        }
    }

    #[test]
    fn repeat_registration_keeps_session_open() {
        assert_eq!(Phase::Open.advance(SessionEvent::Registered), Phase::Open);
    }

    #[test]
    fn every_exit_from_open_closes() {
        for event in [
            SessionEvent::PeerClosed,
            SessionEvent::TransportError,
            SessionEvent::HeartbeatTimeout,
            SessionEvent::ShutdownRequested,
        ] {
            assert_eq!(Phase::Open.advance(event), Phase::Closed, "{event:?}");
        }
    }

    #[test]
    fn closed_is_terminal() {
        for event in ALL_EVENTS {
            assert_eq!(Phase::Closed.advance(event), Phase::Closed, "{event:?}");
        }
    }
}
