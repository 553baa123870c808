// Welcome Service - Rust Edition
// A minimal HTTP API attached to a document store through a supervised connection

//! # Welcome Service Library
//!
//! This is the library crate behind the `server` and `admin` binaries. It
//! serves a single greeting route backed by a document store, and owns the
//! lifecycle of the connection to that store.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`User`]: The one persisted record type (`name` plus timestamps)
//!
//! ### Engine
//! - [`UserStorage`] / [`StoreConnector`]: Narrow seams over the document store driver
//! - [`MongoConnector`]: MongoDB implementation of the connector
//! - [`InMemoryStorage`] / [`InMemoryConnector`]: Development and test backend
//! - [`ConnectionManager`]: Injected handle shared between the supervisor and HTTP handlers
//! - [`ConnectionSupervisor`]: Connect, retry forever on a fixed delay, signal readiness
//!
//! ### Server
//! - [`WelcomeServerBuilder`]: Builds the Axum router and runs it
//!
//! ## Startup Flow
//!
//! ```text
//! main()
//!   ├─ spawns ConnectionSupervisor ── connect ──✗── sleep(retry_delay) ── connect ──✓── seed
//!   │                                     │
//!   │                                     └── ConnectionManager::attach()
//!   └─ runs WelcomeServer (does not wait for the store)
//!         └─ GET /welcome ── ConnectionManager::storage() ── first_user()
//! ```
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports
//! `pub use` statements create shortcuts so users don't need to know the internal
//! module structure. Instead of `use welcome_service::engine::supervisor::ConnectionSupervisor`,
//! users can write `use welcome_service::ConnectionSupervisor`.

// Core domain models
pub mod models;

// Storage seams, connection lifecycle and seeding
pub mod engine;

// HTTP server setup and handlers
pub mod server;

// Environment-driven configuration
pub mod settings;

pub use models::User;

pub use engine::{
    connection::{ConnectionManager, ConnectionState},
    mongo_storage::{MongoConnector, MongoStorage},
    seed::{seed_store, SeedConfig, SeedOutcome, SeedPolicy},
    storage::{InMemoryConnector, InMemoryStorage, StoreConnector, UserStorage},
    supervisor::{ConnectionOutcome, ConnectionSupervisor, SupervisorConfig},
};

pub use server::http::{WelcomeServer, WelcomeServerBuilder, WelcomeServerConfig};

pub use settings::{AppConfig, StoreBackend};

// Core error types
use thiserror::Error;

/// Errors produced by the welcome service
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements the `std::error::Error` trait
/// - `#[error("...")]` provides human-readable error messages
/// - `#[from]` enables automatic conversion from other error types
#[derive(Error, Debug)]
pub enum WelcomeError {
    /// The store answered but holds no matching record
    #[error("Not found: {0}")]
    NotFound(String),

    /// No connection to the store has been established yet
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    /// Driver-level failures (network, server selection, query errors)
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for WelcomeError {
    fn from(err: std::io::Error) -> Self {
        WelcomeError::Internal(err.to_string())
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, WelcomeError>;
