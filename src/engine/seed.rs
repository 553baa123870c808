//! Startup seed record.
//!
//! With the default [`SeedPolicy::Always`] every process start inserts one
//! record without checking what is already stored, so N restarts against a
//! persistent store leave N identical records behind. [`SeedPolicy::IfEmpty`]
//! is the idempotent alternative and has to be opted into.
//!
//! A failed write is logged and dropped: it is never retried and never
//! blocks startup.

use serde::Deserialize;
use tracing::{error, info};

use super::storage::UserStorage;
use crate::models::User;

pub const DEFAULT_SEED_NAME: &str = "Big Bill Brown";

/// When to write the seed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Insert on every start, duplicates included
    #[default]
    Always,
    /// Insert only when the store holds no records
    IfEmpty,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub name: String,
    pub policy: SeedPolicy,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SEED_NAME.to_string(),
            policy: SeedPolicy::Always,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(User),
    Skipped,
    Failed(String),
}

/// Write the seed record according to `config.policy`
pub async fn seed_store(storage: &dyn UserStorage, config: &SeedConfig) -> SeedOutcome {
    match config.policy {
        SeedPolicy::Disabled => return SeedOutcome::Skipped,
        SeedPolicy::IfEmpty => match storage.count_users().await {
            Ok(0) => {}
            Ok(existing) => {
                info!(existing, "store already holds records, skipping seed");
                return SeedOutcome::Skipped;
            }
            Err(e) => {
                error!(error = %e, "failed to count records before seeding");
                return SeedOutcome::Failed(e.to_string());
            }
        },
        SeedPolicy::Always => {}
    }

    match storage.insert_user(User::new(config.name.clone())).await {
        Ok(user) => {
            info!(name = %user.name, "seed record inserted");
            SeedOutcome::Inserted(user)
        }
        Err(e) => {
            error!(error = %e, "failed to insert seed record");
            SeedOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::storage::InMemoryStorage;
    use crate::{Result, WelcomeError};

    struct ReadOnlyStorage;

    #[async_trait::async_trait]
    impl UserStorage for ReadOnlyStorage {
        async fn insert_user(&self, _user: User) -> Result<User> {
            Err(WelcomeError::Storage(anyhow::anyhow!("write refused")))
        }
        async fn first_user(&self) -> Result<Option<User>> {
            Ok(None)
        }
        async fn list_users(&self) -> Result<Vec<User>> {
            Ok(Vec::new())
        }
        async fn count_users(&self) -> Result<u64> {
            Ok(0)
        }
        async fn delete_all_users(&self) -> Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_always_policy_accumulates_duplicates() {
        let storage = InMemoryStorage::new();
        let config = SeedConfig::default();

        for _ in 0..4 {
            assert!(matches!(
                seed_store(&storage, &config).await,
                SeedOutcome::Inserted(_)
            ));
        }
        assert_eq!(storage.count_users().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_if_empty_policy_is_idempotent() {
        let storage = InMemoryStorage::new();
        let config = SeedConfig {
            policy: SeedPolicy::IfEmpty,
            ..SeedConfig::default()
        };

        assert!(matches!(
            seed_store(&storage, &config).await,
            SeedOutcome::Inserted(_)
        ));
        assert_eq!(seed_store(&storage, &config).await, SeedOutcome::Skipped);
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_disabled_policy_writes_nothing() {
        let storage = InMemoryStorage::new();
        let config = SeedConfig {
            policy: SeedPolicy::Disabled,
            ..SeedConfig::default()
        };

        assert_eq!(seed_store(&storage, &config).await, SeedOutcome::Skipped);
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_not_raised() {
        let outcome = seed_store(&ReadOnlyStorage, &SeedConfig::default()).await;
        match outcome {
            SeedOutcome::Failed(message) => assert!(message.contains("write refused")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
