// Core domain models for the welcome service

//! # Domain Models Module
//!
//! The service persists exactly one kind of record: a [`User`] with a single
//! `name` attribute plus store-managed timestamps.
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports for Clean APIs
//! The `pub use` statement below lets callers write
//! `use welcome_service::models::User` instead of
//! `use welcome_service::models::user::User`.

// Declares the `user` submodule from `user.rs`
// Contains User - the seed record served by GET /welcome
pub mod user;

pub use user::User;
