// HTTP server implementation for the welcome service
// One greeting route backed by the document store, plus a health route

//! # HTTP Server
//!
//! Exposes the service over HTTP. The listener starts before the document
//! store is attached, so every handler reads the store through the shared
//! [`ConnectionManager`] on each request.
//!
//! ## Routes
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /welcome` | `200` text greeting for the first record | `404` empty store, `503` not connected, `500` query failure |
//! | `GET /health` | `200` JSON `{ status, store }` | none |
//!
//! ## Rust Learning Notes:
//!
//! ### State Extraction
//! `Router::with_state` stores one value for the whole router, and a
//! handler argument of type `State<T>` clones it out per request. Here the
//! state is an `Arc<ConnectionManager>`, so each clone is a reference count
//! bump.
//!
//! ### Errors as Responses
//! A handler may return `Result<T, E>` whenever both `T` and `E` implement
//! `IntoResponse`. Implementing `IntoResponse` for `WelcomeError` lets
//! handlers use `?` and keeps the status code mapping in one place.

use std::future::Future;
use std::net::TcpListener;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

use crate::engine::connection::{ConnectionManager, ConnectionState};
use crate::WelcomeError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for WelcomeServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_enabled: true,
        }
    }
}

/// HTTP server
///
/// Serves requests whether or not the document store is attached yet.
/// Handlers read the store through the shared [`ConnectionManager`].
pub struct WelcomeServer {
    config: WelcomeServerConfig,
    manager: Arc<ConnectionManager>,
}

impl WelcomeServer {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            config: WelcomeServerConfig::default(),
            manager,
        }
    }

    pub fn with_config(mut self, config: WelcomeServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WelcomeServerConfig {
        &self.config
    }

    /// Build the Axum router with all routes and layers
    pub fn router(&self) -> Router {
        create_router(self.manager.clone(), self.config.cors_enabled)
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<(), BoxError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), BoxError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let addr = listener.local_addr()?;

        info!("🚀 Welcome server running on http://{}", addr);
        info!("👋 Greeting endpoint: http://{}/welcome", addr);
        info!("🩺 Health endpoint: http://{}/health", addr);

        axum::Server::from_tcp(listener)?
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Welcome server stopped");
        Ok(())
    }
}

/// Builder for [`WelcomeServer`]
pub struct WelcomeServerBuilder {
    server: WelcomeServer,
}

impl WelcomeServerBuilder {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            server: WelcomeServer::new(manager),
        }
    }

    pub fn with_config(mut self, config: WelcomeServerConfig) -> Self {
        self.server = self.server.with_config(config);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        let mut config = self.server.config.clone();
        config.port = port;
        self.server = self.server.with_config(config);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let mut config = self.server.config.clone();
        config.host = host.into();
        self.server = self.server.with_config(config);
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        let mut config = self.server.config.clone();
        config.cors_enabled = enabled;
        self.server = self.server.with_config(config);
        self
    }

    pub fn build(self) -> WelcomeServer {
        self.server
    }

    pub async fn build_and_run<F>(self, shutdown: F) -> Result<(), BoxError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.server.run(shutdown).await
    }
}

/// Router with the greeting and health routes
pub fn create_router(manager: Arc<ConnectionManager>, cors_enabled: bool) -> Router {
    let mut app = Router::new()
        .route("/welcome", get(welcome))
        .route("/health", get(health_check))
        .with_state(manager)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Body returned by `GET /welcome`
pub fn welcome_message(name: &str) -> String {
    format!("Hello Client! There is one record in the database for {}", name)
}

// GET /welcome
async fn welcome(State(manager): State<Arc<ConnectionManager>>) -> Result<String, WelcomeError> {
    let storage = manager.storage()?;
    let user = storage
        .first_user()
        .await?
        .ok_or_else(|| WelcomeError::NotFound("the database holds no records".to_string()))?;

    Ok(welcome_message(&user.name))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: ConnectionState,
}

// Health check endpoint, answers regardless of store state
async fn health_check(State(manager): State<Arc<ConnectionManager>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: manager.state(),
    })
}

impl IntoResponse for WelcomeError {
    fn into_response(self) -> Response {
        let status = match &self {
            WelcomeError::NotFound(_) => StatusCode::NOT_FOUND,
            WelcomeError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, "request rejected");
        }

        (status, self.to_string()).into_response()
    }
}
