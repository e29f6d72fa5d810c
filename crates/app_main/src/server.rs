//! HTTP server setup

use crate::handlers;
use anyhow::Context;
use app_core::{AppConfig, MutationKind};
use app_fs::{DefaultGalleryOperations, GalleryOperations, MediaIndexer, ServedRoot};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

/// Shared state for all handlers
pub struct AppContext {
    pub root: ServedRoot,
    pub indexer: MediaIndexer,
    pub operations: Arc<dyn GalleryOperations>,
    pub config: AppConfig,
}

impl AppContext {
    pub fn new(directory: &Path, config: AppConfig) -> anyhow::Result<Self> {
        let root = ServedRoot::new(directory)
            .with_context(|| format!("Cannot serve {}", directory.display()))?;
        let extensions = config.media.extensions();

        Ok(Self {
            indexer: MediaIndexer::new(root.path(), extensions.clone()),
            operations: Arc::new(DefaultGalleryOperations::new(root.clone(), extensions)),
            root,
            config,
        })
    }
}

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(MutationKind::Delete.endpoint().1, delete(handlers::delete_file))
        .route(MutationKind::Favorite.endpoint().1, post(handlers::favorite_file))
        .fallback(handlers::serve_media)
        .with_state(ctx)
}

/// Serve until Ctrl+C
pub async fn run(directory: &Path, config: AppConfig) -> anyhow::Result<()> {
    let open_browser = config.server.open_browser;
    let bind = format!("{}:{}", config.server.host, config.server.port);

    let ctx = Arc::new(AppContext::new(directory, config)?);
    let served = ctx.root.path().display().to_string();

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    let addr = listener.local_addr()?;
    let url = browser_url(addr);

    tracing::info!("Serving {} at {}", served, url);
    println!("Serving {} at {}", served, url);

    if open_browser {
        tokio::task::spawn_blocking(move || {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        });
    }

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wildcard binds are opened through loopback
fn browser_url(addr: SocketAddr) -> String {
    let host = match addr.ip() {
        ip if ip.is_unspecified() && ip.is_ipv4() => "127.0.0.1".to_string(),
        ip if ip.is_unspecified() => "[::1]".to_string(),
        ip if ip.is_ipv6() => format!("[{}]", ip),
        ip => ip.to_string(),
    };
    format!("http://{}:{}/", host, addr.port())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_url() {
        assert_eq!(browser_url("0.0.0.0:8000".parse().unwrap()), "http://127.0.0.1:8000/");
        assert_eq!(browser_url("192.168.1.5:80".parse().unwrap()), "http://192.168.1.5:80/");
        assert_eq!(browser_url("[::]:9000".parse().unwrap()), "http://[::1]:9000/");
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(AppContext::new(&missing, AppConfig::default()).is_err());
    }
}
