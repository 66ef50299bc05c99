//! API router configuration and server lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    routing::{any, get},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{health, status, AppState};
use super::websocket::ws_handler;
use crate::error::PlaygroundError;
use crate::lang::{Language, Lisp};
use crate::session::{spawn_collector, GcConfig};

/// Create the router for the built-in language, without static assets.
pub fn create_router() -> Router {
    create_router_with_state::<Lisp>(AppState::new(), None)
}

/// Create the router with custom state.
///
/// Requests that match no route are served from `assets_dir` when given.
pub fn create_router_with_state<L: Language>(
    state: AppState<L>,
    assets_dir: Option<&Path>,
) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/status", get(status::<L>))
        .route("/ws", any(ws_handler::<L>));

    if let Some(dir) = assets_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory with the front-end assets.
    pub assets_dir: Option<PathBuf>,
    /// Stop on Ctrl-C / SIGTERM after in-flight requests finish.
    pub graceful_shutdown: bool,
    /// Session collector timing.
    pub gc: GcConfig,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_assets(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    pub fn with_gc(mut self, gc: GcConfig) -> Self {
        self.gc = gc;
        self
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            assets_dir: None,
            graceful_shutdown: true,
            gc: GcConfig::default(),
        }
    }
}

/// Start the server and the session collector.
///
/// Fails only if the listener cannot be bound or the server dies. The
/// collector is stopped before returning.
pub async fn serve<L: Language>(config: ServerConfig, state: AppState<L>) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router_with_state(state.clone(), config.assets_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(PlaygroundError::Io)?;
    tracing::info!("Server running on {}", listener.local_addr()?);

    let cancel = CancellationToken::new();
    let collector = spawn_collector(Arc::clone(&state.store), config.gc, cancel.clone());

    let server = axum::serve(listener, router);
    let result = if config.graceful_shutdown {
        server.with_graceful_shutdown(shutdown_signal()).await
    } else {
        server.await
    };

    cancel.cancel();
    if let Err(e) = collector.await {
        tracing::warn!("Session collector ended abnormally: {}", e);
    }

    result.map_err(PlaygroundError::Io)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
