//! # camisa
//!
//! Shirt catalog server binary. Opens the catalog database, prepares the
//! media root, and serves the REST + WebSocket API until interrupted.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use camisa_server::config::ServerConfig;
use camisa_server::media::MediaStore;
use camisa_server::server::CatalogServer;
use camisa_server::shutdown::DEFAULT_SHUTDOWN_TIMEOUT;
use camisa_store::{CatalogStore, PoolConfig};

/// Shirt catalog server.
#[derive(Parser, Debug)]
#[command(name = "camisa", about = "Shirt catalog server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (0 picks a free port).
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Directory holding shirt images.
    #[arg(long, env = "NETWORK_PATH")]
    network_path: Option<PathBuf>,

    /// Path to the SQLite database file.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: Option<PathBuf>,

    /// Maximum concurrent WebSocket connections.
    #[arg(long)]
    max_connections: Option<usize>,
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".camisa").join("camisa.db")
}

fn default_media_root() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".camisa").join("shirt-images")
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_path = args.db_path.unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;
    let pool = camisa_store::open_file(&db_path, &PoolConfig::default())
        .context("Failed to open database")?;
    let store = CatalogStore::new(pool);
    let applied = store.migrate().context("Failed to run migrations")?;
    tracing::info!(db = %db_path.display(), applied, "catalog store ready");

    let media_root = args.network_path.unwrap_or_else(default_media_root);
    let media = MediaStore::new(&media_root).context("Failed to prepare media root")?;
    tracing::info!(root = %media_root.display(), "media root ready");

    let mut config = ServerConfig {
        host: args.host,
        port: args.port,
        media_root,
        ..ServerConfig::default()
    };
    if let Some(max) = args.max_connections {
        config.max_connections = max;
    }

    let metrics = camisa_server::metrics::install_recorder();
    let server = CatalogServer::new(config, store, media).with_metrics(metrics);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("camisa listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    tracing::info!("interrupt received, shutting down");
    server
        .shutdown()
        .graceful_shutdown(vec![handle], DEFAULT_SHUTDOWN_TIMEOUT)
        .await;
    tracing::info!("shutdown complete");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
