// User record - the single persisted entity

//! # User Model
//!
//! A `User` carries one semantic attribute, `name`, plus creation and update
//! timestamps. There are no relationships, no uniqueness constraints and no
//! validation rules. The persisted layout is `{ name, createdAt, updatedAt }`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A persisted record
///
/// ## Rust Learning Notes:
///
/// ### Serde Field Renaming
/// `#[serde(rename_all = "camelCase")]` turns `created_at` into `createdAt`
/// when serializing, so the JSON shape matches what is stored in the
/// document store without giving up snake_case field names in Rust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Display name, the only semantic attribute
    pub name: String,

    /// When the record was first written (UTC)
    pub created_at: DateTime<Utc>,

    /// When the record was last written (UTC)
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new record stamped with the current time
    ///
    /// The timestamp is truncated to whole milliseconds, the precision the
    /// document store keeps, so a record reads back equal to what was written.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now().trunc_subsecs(3);
        Self {
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
