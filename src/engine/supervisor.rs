// Connection supervisor for the document store
// Connect, retry forever on a fixed delay, signal readiness once

//! # Connection Supervisor
//!
//! Owns the startup lifecycle of the single logical connection to the
//! document store. It runs as its own tokio task so the HTTP server starts
//! accepting requests immediately; requests that need the store before the
//! first successful connect get `StoreUnavailable`.
//!
//! ## Retry Policy
//!
//! - Every failed attempt is logged together with the pending retry
//! - Exactly one new attempt is scheduled `retry_delay` after each failure
//! - No maximum attempt count, no backoff, no circuit breaker
//! - A failure is never fatal to the process
//!
//! ## Readiness
//!
//! The "connected" log line and the seed step both follow the first
//! [`ConnectionManager::attach`] only. Running the supervisor again on the
//! same manager (a reconnect cycle) attaches silently and writes nothing.
//!
//! ## Shutdown
//!
//! The retry timer and any in-flight attempt are raced against a
//! `CancellationToken`, so process shutdown stops supervision instead of
//! leaving a retry loop behind.
//!
//! ## Rust Learning Notes:
//!
//! ### tokio::select!
//! `select!` waits on several futures and runs the branch of whichever
//! finishes first, dropping the others. Dropping a `sleep` future cancels
//! the timer, which is what makes the retry delay cancellable.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::connection::{ConnectionManager, ConnectionState};
use super::seed::{seed_store, SeedConfig};
use super::storage::StoreConnector;

pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/test";
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Supervisor settings
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Connection descriptor handed to the connector
    pub uri: String,

    /// Fixed delay between a failed attempt and the next one
    pub retry_delay: Duration,

    /// Seed step run after the connection is established
    pub seed: SeedConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_MONGO_URI.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
            seed: SeedConfig::default(),
        }
    }
}

/// How a supervision run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Attached after `attempts` tries (1 means first try). `announced` is
    /// false when the manager already held a store from an earlier cycle.
    Connected { attempts: u64, announced: bool },
    /// Shutdown was requested before a connection was made
    Cancelled { attempts: u64 },
}

pub struct ConnectionSupervisor {
    connector: Arc<dyn StoreConnector>,
    manager: Arc<ConnectionManager>,
    config: SupervisorConfig,
}

impl ConnectionSupervisor {
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        manager: Arc<ConnectionManager>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            connector,
            manager,
            config,
        }
    }

    /// Start supervising in the background
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<ConnectionOutcome> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    /// Attempt to connect until success or cancellation
    pub async fn run(&self, shutdown: CancellationToken) -> ConnectionOutcome {
        let target = redact_uri(&self.config.uri);
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            self.manager.set_state(ConnectionState::Connecting);
            debug!(uri = %target, attempt = attempts, "connecting to document store");

            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    self.manager.set_state(ConnectionState::Disconnected);
                    info!(attempts, "shutdown requested, abandoning document store connection");
                    return ConnectionOutcome::Cancelled { attempts };
                }
                result = self.connector.connect(&self.config.uri) => result,
            };

            match result {
                Ok(storage) => {
                    let announced = self.manager.attach(storage.clone());
                    if announced {
                        info!(uri = %target, attempts, "connected to document store");
                        seed_store(storage.as_ref(), &self.config.seed).await;
                    } else {
                        debug!(uri = %target, attempts, "document store already attached");
                    }
                    return ConnectionOutcome::Connected { attempts, announced };
                }
                Err(e) => {
                    self.manager.set_state(ConnectionState::Disconnected);
                    error!(uri = %target, error = %e, "failed to connect to document store");
                    warn!(
                        "retrying document store connection in {} seconds",
                        self.config.retry_delay.as_secs_f64()
                    );
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(attempts, "shutdown requested, cancelling pending connection retry");
                    return ConnectionOutcome::Cancelled { attempts };
                }
                _ = tokio::time::sleep(self.config.retry_delay) => {}
            }
        }
    }
}

/// Mask the password of a connection descriptor for logging
///
/// Descriptors the `url` crate cannot parse (e.g. multi-host seed lists)
/// have their whole userinfo section masked instead.
pub fn redact_uri(uri: &str) -> String {
    if let Ok(mut parsed) = url::Url::parse(uri) {
        if parsed.password().is_some() && parsed.set_password(Some("****")).is_ok() {
            return parsed.to_string();
        }
        return uri.to_string();
    }

    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}****{}", &uri[..scheme_end + 3], &uri[at..])
        }
        _ => uri.to_string(),
    }
}
