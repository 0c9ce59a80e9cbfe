//! # Juicebox Core
//!
//! The domain layer of the Juicebox blogging backend.
//! This crate holds the post, tag and user shapes plus the repository ports;
//! it has no storage dependency.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
