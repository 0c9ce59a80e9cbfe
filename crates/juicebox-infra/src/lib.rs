//! # Juicebox Infrastructure
//!
//! Concrete implementations of the ports defined in `juicebox-core`.
//! This crate contains the relational storage layer and credential hashing.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - Configuration types only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - Argon2 credential hashing

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::{DatabaseConfig, ReadStrategy};

#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresTagRepository, PostgresUserRepository};

#[cfg(feature = "auth")]
pub use auth::Argon2PasswordService;
