// Connection manager shared by the supervisor and the HTTP handlers

//! # Connection Manager
//!
//! Holds the one logical connection to the document store and makes its
//! state observable. It is created once at startup and passed explicitly to
//! both the [`ConnectionSupervisor`](super::supervisor::ConnectionSupervisor)
//! (the only writer) and the HTTP layer (readers), so tests can hand in a
//! fake store instead of a real driver.
//!
//! ## State Machine
//!
//! ```text
//! Disconnected ──attempt──▶ Connecting ──ok──▶ Connected
//!      ▲                        │
//!      └──────── error ─────────┘   (supervisor sleeps, then attempts again)
//! ```
//!
//! `Connected` has no outgoing edge here. Once the driver is attached it owns
//! reconnection after a later drop.
//!
//! ## One-time readiness
//!
//! The first [`attach`](ConnectionManager::attach) installs the store handle
//! and reports `true`. Later attaches are not re-armed: the original handle
//! stays in place and `false` is returned, so callers do not announce the
//! connection a second time.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tokio::sync::watch;

use super::storage::UserStorage;
use crate::{Result, WelcomeError};

/// Observable lifecycle of the store connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// Injected handle to the document store connection
///
/// ## Rust Learning Notes:
///
/// ### OnceLock
/// `OnceLock<T>` can be written exactly once and read many times without a
/// lock on the read path. That matches the lifecycle here: one writer
/// installs the store handle, every request reads it.
///
/// ### watch Channels
/// `tokio::sync::watch` keeps only the latest value. Subscribers can await
/// `changed()` to react to state transitions, which is how tests wait for
/// the supervisor without sleeping.
pub struct ConnectionManager {
    state: watch::Sender<ConnectionState>,
    storage: OnceLock<Arc<dyn UserStorage>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            state,
            storage: OnceLock::new(),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub(crate) fn set_state(&self, next: ConnectionState) {
        self.state.send_replace(next);
    }

    /// Install the store handle after a successful connect
    ///
    /// Returns `true` only for the first attach on this manager.
    pub fn attach(&self, storage: Arc<dyn UserStorage>) -> bool {
        let first = self.storage.set(storage).is_ok();
        self.set_state(ConnectionState::Connected);
        first
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The attached store, or `StoreUnavailable` before the first connect
    pub fn storage(&self) -> Result<Arc<dyn UserStorage>> {
        self.storage.get().cloned().ok_or_else(|| {
            WelcomeError::StoreUnavailable(format!(
                "no connection established (state: {})",
                self.state()
            ))
        })
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
