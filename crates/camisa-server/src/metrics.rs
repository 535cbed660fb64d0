//! Prometheus metrics recorder and metric name constants.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

// Metric name constants to avoid typos across modules.

/// Total WebSocket connections accepted since startup.
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Total WebSocket sessions ended since startup.
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Currently open WebSocket connections.
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Broadcast sends that failed and evicted their connection.
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";
/// Session lifetime distribution in seconds.
pub const WS_SESSION_DURATION_SECONDS: &str = "ws_session_duration_seconds";
/// Successful catalog mutations that triggered a notification.
pub const CATALOG_MUTATIONS_TOTAL: &str = "catalog_mutations_total";

/// Install the global Prometheus recorder.
///
/// Must be called once at startup, before any metric is recorded. The
/// returned handle renders the `/metrics` endpoint.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render the current metrics in Prometheus text exposition format.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
