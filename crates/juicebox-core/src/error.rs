//! Repository-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Boxed storage backend error, kept intact as the error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Repository-level errors.
///
/// Unique-constraint hits on usernames and tag names are not errors; they show
/// up as an absent result or as the existing row.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(#[source] BoxError),

    #[error("Query execution failed: {0}")]
    Query(#[source] BoxError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i32 },

    #[error("Data integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Credential(#[from] AuthError),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: i32) -> Self {
        Self::NotFound { entity_type, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
