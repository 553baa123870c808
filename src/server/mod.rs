// Welcome Service Server Implementations

//! # Server Module
//!
//! Exposes the engine over HTTP. The server layer sits on top of the engine
//! layer and never touches the database driver directly.
//!
//! ```text
//! Client
//!        ↓ HTTP
//! Server Layer (this module) ← Axum router, handlers, shutdown signal
//!        ↓ ConnectionManager
//! Engine Layer ← storage seams, supervisor, seed
//! ```

/// HTTP server implementation
///
/// Contains:
/// - Axum router with `/welcome` and `/health`
/// - Error to status code mapping
/// - Builder pattern for server configuration
pub mod http;

/// Ctrl+C / SIGTERM handling shared by the server and the supervisor
pub mod shutdown;

#[cfg(test)]
mod http_tests;

pub use http::{WelcomeServer, WelcomeServerBuilder, WelcomeServerConfig};
pub use shutdown::shutdown_signal;
