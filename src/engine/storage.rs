// Storage abstraction for the welcome service
// This defines the interface for persisting and reading User records

//! # Storage Abstraction Layer
//!
//! The HTTP handlers and the seed step never talk to a database driver
//! directly. They go through two small traits:
//!
//! - **UserStorage**: the query surface (insert, first, list, count, purge)
//! - **StoreConnector**: one connection attempt that yields a `UserStorage`
//!
//! ## Implementations
//!
//! - **InMemoryStorage / InMemoryConnector**: development backend and test fake
//! - **MongoStorage / MongoConnector**: MongoDB backend (see `mongo_storage`)
//!
//! ## Rust Learning Notes:
//!
//! ### Async Traits
//! The `async-trait` crate lets trait methods be `async fn` while still being
//! usable as trait objects (`Arc<dyn UserStorage>`).
//!
//! ### Trait Bounds
//! - `Send`: Type can be safely moved between threads
//! - `Sync`: Type can be safely shared between threads via references
//! These bounds are required because handlers run on the tokio thread pool.

use std::sync::{Arc, RwLock};

use crate::models::User;
use crate::{Result, WelcomeError};

/// Query surface over the persisted `User` records
///
/// ## Return Value
/// `Result<Option<User>>` means:
/// - `Ok(Some(user))`: Found a record
/// - `Ok(None)`: The store is empty (not an error at this layer)
/// - `Err(error)`: Operation failed (network error, driver error, etc.)
#[async_trait::async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a record. No existence check is performed.
    async fn insert_user(&self, user: User) -> Result<User>;

    /// The earliest inserted record, if any
    async fn first_user(&self) -> Result<Option<User>>;

    /// All records in insertion order
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn count_users(&self) -> Result<u64>;

    /// Remove every record and return how many were deleted
    async fn delete_all_users(&self) -> Result<u64>;
}

/// One connection attempt against a document store
///
/// A successful `connect` means the store answered; the returned handle is
/// ready for queries. A failed attempt is reported as `Err` and the caller
/// decides whether to retry.
#[async_trait::async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, uri: &str) -> Result<Arc<dyn UserStorage>>;
}

/// In-memory storage implementation for development and testing
///
/// ## Limitations
///
/// - **Not persistent**: Data is lost when process restarts
/// - **Not distributed**: Cannot share data across multiple processes
///
/// ## Rust Learning Notes:
///
/// ### Interior Mutability Pattern
/// Even though methods take `&self`, records can still be appended
/// through the `RwLock`. Guards unlock automatically when dropped (RAII).
#[derive(Default)]
pub struct InMemoryStorage {
    /// Records in insertion order
    users: RwLock<Vec<User>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: std::sync::PoisonError<T>) -> WelcomeError {
        WelcomeError::Internal("in-memory user store lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl UserStorage for InMemoryStorage {
    async fn insert_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        users.push(user.clone());
        Ok(user)
    }

    async fn first_user(&self) -> Result<Option<User>> {
        let users = self.users.read().map_err(Self::poisoned)?;
        Ok(users.first().cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().map_err(Self::poisoned)?;
        Ok(users.clone())
    }

    async fn count_users(&self) -> Result<u64> {
        let users = self.users.read().map_err(Self::poisoned)?;
        Ok(users.len() as u64)
    }

    async fn delete_all_users(&self) -> Result<u64> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        let removed = users.len() as u64;
        users.clear();
        Ok(removed)
    }
}

/// Connector that always hands out the same in-memory store
///
/// Every `connect` succeeds immediately. Sharing one `InMemoryStorage`
/// between connectors models a store that outlives process restarts.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    storage: Arc<InMemoryStorage>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(storage: Arc<InMemoryStorage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> Arc<InMemoryStorage> {
        self.storage.clone()
    }
}

#[async_trait::async_trait]
impl StoreConnector for InMemoryConnector {
    async fn connect(&self, _uri: &str) -> Result<Arc<dyn UserStorage>> {
        Ok(self.storage.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_user_is_earliest_insert() {
        let storage = InMemoryStorage::new();
        assert!(storage.first_user().await.unwrap().is_none());

        storage.insert_user(User::new("Big Bill Brown")).await.unwrap();
        storage.insert_user(User::new("Second")).await.unwrap();

        let first = storage.first_user().await.unwrap().unwrap();
        assert_eq!(first.name, "Big Bill Brown");
        assert_eq!(storage.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_does_not_deduplicate() {
        let storage = InMemoryStorage::new();
        for _ in 0..3 {
            storage.insert_user(User::new("Big Bill Brown")).await.unwrap();
        }

        let names: Vec<String> = storage
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Big Bill Brown"; 3]);
    }

    #[tokio::test]
    async fn test_delete_all_users_reports_count() {
        let storage = InMemoryStorage::new();
        storage.insert_user(User::new("a")).await.unwrap();
        storage.insert_user(User::new("b")).await.unwrap();

        assert_eq!(storage.delete_all_users().await.unwrap(), 2);
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connector_shares_storage() {
        let connector = InMemoryConnector::new();
        let handle = connector.connect("memory://").await.unwrap();
        handle.insert_user(User::new("shared")).await.unwrap();

        assert_eq!(connector.storage().count_users().await.unwrap(), 1);
    }
}
