//! Relational storage: entities, the post/tag synchronization components and the repositories.
//!
//! The component modules take any `ConnectionTrait`, so the same code runs on
//! the shared pool or inside a transaction.

mod connections;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
pub mod post_reader;
#[cfg(feature = "postgres")]
pub mod post_tag_linker;
#[cfg(feature = "postgres")]
pub mod post_writer;
#[cfg(feature = "postgres")]
pub mod postgres_repo;
#[cfg(feature = "postgres")]
pub mod tag_registry;
#[cfg(feature = "postgres")]
pub mod user_store;

pub use connections::{DatabaseConfig, ParseReadStrategyError, ReadStrategy};

#[cfg(feature = "postgres")]
pub use connections::connect;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository, RepositoryOptions,
};

#[cfg(feature = "postgres")]
use juicebox_core::error::RepoError;
#[cfg(feature = "postgres")]
use sea_orm::DbErr;

/// Wrap a SeaORM error, keeping it as the source.
#[cfg(feature = "postgres")]
pub(crate) fn db_err(err: DbErr) -> RepoError {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => RepoError::Connection(Box::new(err)),
        other => RepoError::Query(Box::new(other)),
    }
}

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
