// Welcome Service Engine
// Storage seams, the connection lifecycle and the startup seed

//! # Engine Module
//!
//! Everything between the HTTP handlers and the document store driver.
//!
//! ## Engine Components
//!
//! ### Storage (`storage` module)
//! - `UserStorage` and `StoreConnector` traits
//! - In-memory implementation for development/testing
//!
//! ### MongoDB (`mongo_storage` module)
//! - Driver-backed connector and storage
//!
//! ### Connection (`connection` module)
//! - `ConnectionManager`, the injected handle shared with the HTTP layer
//! - `ConnectionState` observable through a watch channel
//!
//! ### Supervisor (`supervisor` module)
//! - Connect, retry forever on a fixed delay, cancellable on shutdown
//!
//! ### Seed (`seed` module)
//! - Startup seed record and its insert policy

pub mod connection;
pub mod mongo_storage;
pub mod seed;
pub mod storage;
pub mod supervisor;

pub use connection::{ConnectionManager, ConnectionState};
pub use mongo_storage::{MongoConnector, MongoStorage};
pub use seed::{seed_store, SeedConfig, SeedOutcome, SeedPolicy};
pub use storage::{InMemoryConnector, InMemoryStorage, StoreConnector, UserStorage};
pub use supervisor::{redact_uri, ConnectionOutcome, ConnectionSupervisor, SupervisorConfig};
