//! HTTP server for course alignment

pub mod routes;
pub mod state;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AlignConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Course alignment HTTP server
pub struct AlignServer {
    config: AlignConfig,
    state: AppState,
}

impl AlignServer {
    /// Create a server with the default collaborators for `config`
    pub async fn new(config: AlignConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Create a server around prepared state
    pub fn with_state(config: AlignConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let router = Router::new()
            // Health check
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .nest("/api", routes::api_routes(self.config.server.max_upload_size))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting course alignment server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let storage_ok = state.documents().health_check().await.unwrap_or(false);
    if state.is_ready() && storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
