// MongoDB storage implementation for the welcome service
// Records live in the `users` collection of the URI's default database

//! # MongoDB Storage Implementation
//!
//! Implements [`StoreConnector`] and [`UserStorage`] on top of the official
//! `mongodb` driver.
//!
//! ## Connecting
//!
//! The driver connects lazily, so building a `Client` proves nothing about
//! reachability. A connection attempt therefore:
//! 1. parses the connection descriptor into `ClientOptions`
//! 2. bounds server selection by `connect_timeout`
//! 3. runs `ping` against the target database
//!
//! Only a successful `ping` counts as "connected". After that, the driver's
//! own pool handles dropped sockets.
//!
//! ## Document Layout
//!
//! ```text
//! users: { _id: ObjectId, name: string, createdAt: Date, updatedAt: Date }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    options::{ClientOptions, FindOneOptions, FindOptions},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::storage::{StoreConnector, UserStorage};
use crate::models::User;
use crate::Result;

pub const USERS_COLLECTION: &str = "users";
pub const FALLBACK_DATABASE: &str = "test";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const APP_NAME: &str = "welcome-service";

/// Wire representation of a `User`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: bson::DateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: None,
            name: user.name.clone(),
            created_at: bson::DateTime::from_chrono(user.created_at),
            updated_at: bson::DateTime::from_chrono(user.updated_at),
        }
    }
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        Self {
            name: document.name,
            created_at: document.created_at.to_chrono(),
            updated_at: document.updated_at.to_chrono(),
        }
    }
}

/// Opens MongoDB connections
#[derive(Debug, Clone)]
pub struct MongoConnector {
    connect_timeout: Duration,
}

impl MongoConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Connect and confirm the server answers, returning the concrete type
    pub async fn open(&self, uri: &str) -> Result<MongoStorage> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| anyhow::anyhow!("Invalid MongoDB connection string: {}", e))?;
        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(self.connect_timeout);
        options.connect_timeout = Some(self.connect_timeout);

        let database_name = options
            .default_database
            .clone()
            .unwrap_or_else(|| FALLBACK_DATABASE.to_string());

        let client = Client::with_options(options)
            .map_err(|e| anyhow::anyhow!("Failed to create MongoDB client: {}", e))?;
        let database = client.database(&database_name);

        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to MongoDB: {}", e))?;

        Ok(MongoStorage::new(client, database))
    }
}

impl Default for MongoConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait::async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self, uri: &str) -> Result<Arc<dyn UserStorage>> {
        let storage = self.open(uri).await?;
        Ok(Arc::new(storage))
    }
}

/// MongoDB-backed `UserStorage`
pub struct MongoStorage {
    // Keeps the driver's connection pool alive alongside the collection handle
    _client: Client,
    database: Database,
    users: Collection<UserDocument>,
}

impl MongoStorage {
    fn new(client: Client, database: Database) -> Self {
        let users = database.collection::<UserDocument>(USERS_COLLECTION);
        Self {
            _client: client,
            database,
            users,
        }
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    fn insertion_order() -> bson::Document {
        doc! { "_id": 1 }
    }
}

#[async_trait::async_trait]
impl UserStorage for MongoStorage {
    async fn insert_user(&self, user: User) -> Result<User> {
        self.users
            .insert_one(UserDocument::from(&user), None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert user: {}", e))?;
        Ok(user)
    }

    async fn first_user(&self) -> Result<Option<User>> {
        let options = FindOneOptions::builder()
            .sort(Self::insertion_order())
            .build();
        let document = self
            .users
            .find_one(None, options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to query users: {}", e))?;
        Ok(document.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let options = FindOptions::builder().sort(Self::insertion_order()).build();
        let cursor = self
            .users
            .find(None, options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to query users: {}", e))?;
        let documents: Vec<UserDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read users cursor: {}", e))?;
        Ok(documents.into_iter().map(User::from).collect())
    }

    async fn count_users(&self) -> Result<u64> {
        let count = self
            .users
            .count_documents(None, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to count users: {}", e))?;
        Ok(count)
    }

    async fn delete_all_users(&self) -> Result<u64> {
        let result = self
            .users
            .delete_many(doc! {}, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete users: {}", e))?;
        Ok(result.deleted_count)
    }
}
