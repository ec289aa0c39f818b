//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::AuthManager;
use super::routes;
use crate::app::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::sqlite::SqlitePool;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: Arc<AuthManager>,
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Build the full application router
    pub fn router(state: AppState) -> Router {
        Router::new()
            .nest("/api/v1", routes::api_routes())
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Serve until ctrl-c
    pub async fn start(self) -> Result<()> {
        let host = self.app.config.server.host.clone();
        let port = self.app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let state = AppState {
            pool: self.app.database.pool().clone(),
            auth: self.app.auth.clone(),
        };
        let router = Self::router(state);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, auth = self.app.auth.is_enabled(), "API server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.app.database.close().await;
        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
