//! HTTP server wiring.
//!
//! [`CatalogServer`] owns every long-lived component and hands handlers a
//! cloneable [`AppState`]. The broadcast hub is constructed here, once, and
//! reaches the upgrade endpoint and the mutation handlers only through that
//! state.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use camisa_store::CatalogStore;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::media::MediaStore;
use crate::notify::ChangeNotifier;
use crate::routes;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::hub::BroadcastHub;
use crate::websocket::session::ws_handler;

/// Shared state reachable from every handler.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Catalog persistence.
    pub store: Arc<CatalogStore>,
    /// Image files on disk.
    pub media: Arc<MediaStore>,
    /// Connection registry and broadcast fan-out.
    pub hub: Arc<BroadcastHub>,
    /// Announces catalog changes over the hub.
    pub notifier: Arc<ChangeNotifier>,
    /// Shutdown signal shared with every session.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started, for uptime reporting.
    pub start_time: Instant,
    /// Prometheus render handle, when metrics are installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The catalog server.
pub struct CatalogServer {
    config: Arc<ServerConfig>,
    store: Arc<CatalogStore>,
    media: Arc<MediaStore>,
    hub: Arc<BroadcastHub>,
    notifier: Arc<ChangeNotifier>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: Option<PrometheusHandle>,
}

impl CatalogServer {
    /// Wire up a server.
    ///
    /// The hub and notifier are created here and shared with handlers
    /// through [`AppState`]; nothing real-time lives in a global.
    pub fn new(config: ServerConfig, store: CatalogStore, media: MediaStore) -> Self {
        let hub = Arc::new(BroadcastHub::new());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            media: Arc::new(media),
            notifier: Arc::new(ChangeNotifier::new(hub.clone())),
            hub,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Attach an installed Prometheus handle, enabling `GET /metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// The broadcast hub.
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// The active configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router with every route and layer attached.
    pub fn router(&self) -> Router {
        let state = AppState {
            config: self.config.clone(),
            store: self.store.clone(),
            media: self.media.clone(),
            hub: self.hub.clone(),
            notifier: self.notifier.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .route(
                "/api/person",
                get(routes::people::list).post(routes::people::create),
            )
            .route(
                "/api/person/{id}",
                put(routes::people::update).delete(routes::people::remove),
            )
            .route(
                "/api/shirt",
                get(routes::shirts::list).post(routes::shirts::create),
            )
            .route("/api/shirt/by-person/{person_id}", get(routes::shirts::by_person))
            .route(
                "/api/shirt/{id}",
                get(routes::shirts::get)
                    .put(routes::shirts::update)
                    .delete(routes::shirts::remove),
            )
            .route("/api/getImage/{image}", get(routes::images::get_image))
            .route("/download/{image}", get(routes::images::download))
            .route("/files", get(routes::files::tree))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .with_state(state)
    }

    /// Bind and serve until the shutdown signal fires.
    ///
    /// Returns the bound address and the serve task's handle.
    pub async fn listen(&self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(err) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %err, "server error");
            }
        });
        info!(%addr, "listening");
        Ok((addr, handle))
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.hub.connection_count().await;
    Json(health::health_check(state.start_time, connections))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => crate::metrics::render(handle).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn make_server() -> (CatalogServer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = camisa_store::open_in_memory(&camisa_store::PoolConfig::default()).unwrap();
        let store = CatalogStore::new(pool);
        let _ = store.migrate().unwrap();
        let media = MediaStore::new(dir.path().join("media")).unwrap();
        (
            CatalogServer::new(ServerConfig::default(), store, media),
            dir,
        )
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        let boundary = "test-boundary";
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn person_create_and_list_roundtrip() {
        let (server, _dir) = make_server();
        let app = server.router();

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/person",
                serde_json::json!({ "name": "Dana" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["name"], "Dana");

        let resp = app
            .oneshot(Request::builder().uri("/api/person").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let people = body_json(resp).await;
        assert_eq!(people.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn person_create_requires_name() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(json_request(
                "POST",
                "/api/person",
                serde_json::json!({ "name": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "missing required fields");
    }

    #[tokio::test]
    async fn person_update_missing_returns_404() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(json_request(
                "PUT",
                "/api/person/per_missing",
                serde_json::json!({ "name": "New" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn shirt_create_without_required_fields_is_400() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(multipart_request("POST", "/api/shirt", &[("link", "x")]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "missing required fields");
    }

    #[tokio::test]
    async fn shirt_create_with_unknown_person_is_400() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(multipart_request(
                "POST",
                "/api/shirt",
                &[("title", "Tee"), ("personId", "per_missing")],
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("unknown person"));
    }

    #[tokio::test]
    async fn shirt_crud_over_the_router() {
        let (server, _dir) = make_server();
        let app = server.router();

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/person",
                serde_json::json!({ "name": "Rafa" }),
            ))
            .await
            .unwrap();
        let person_id = body_json(resp).await["id"].as_str().unwrap().to_owned();

        let resp = app
            .clone()
            .oneshot(multipart_request(
                "POST",
                "/api/shirt",
                &[
                    ("title", "Away 2024"),
                    ("personId", &person_id),
                    ("priceInCents", "4999"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["title"], "Away 2024");
        assert_eq!(created["priceInCents"], 4999);
        assert_eq!(created["status"], 0);
        let shirt_id = created["id"].as_i64().unwrap();

        let resp = app
            .clone()
            .oneshot(multipart_request(
                "PUT",
                &format!("/api/shirt/{shirt_id}"),
                &[("size", "M"), ("status", "1")],
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["size"], "M");
        assert_eq!(updated["status"], 1);
        assert_eq!(updated["title"], "Away 2024");

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/shirt/{shirt_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/shirt/{shirt_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn shirt_non_numeric_id_is_400() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/shirt/banana")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "invalid id: banana");
    }

    #[tokio::test]
    async fn metrics_route_without_handle_is_404() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_route_with_handle_renders() {
        let (server, _dir) = make_server();
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let server = server.with_metrics(handle);
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/person")
                    .header(header::ORIGIN, "http://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn ws_route_rejects_a_plain_get() {
        let (server, _dir) = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = camisa_store::open_in_memory(&camisa_store::PoolConfig::default()).unwrap();
        let store = CatalogStore::new(pool);
        let _ = store.migrate().unwrap();
        let media = MediaStore::new(dir.path().join("media")).unwrap();
        let config = ServerConfig {
            max_upload_bytes: 64,
            ..ServerConfig::default()
        };
        let server = CatalogServer::new(config, store, media);

        let resp = server
            .router()
            .oneshot(json_request(
                "POST",
                "/api/person",
                serde_json::json!({ "name": "x".repeat(500) }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
