//! PostgreSQL repository implementations.
//!
//! The repositories own the transaction boundary: with `atomic_mutations` on,
//! every write runs inside one transaction that is committed only if all of
//! its steps succeed.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, DbConn, TransactionTrait};

use juicebox_core::domain::{NewPost, NewUser, Post, PostChanges, Tag, User, UserChanges};
use juicebox_core::error::RepoError;
use juicebox_core::ports::{
    PasswordService, PlainPasswords, PostRepository, TagRepository, UserRepository,
};

use super::{DatabaseConfig, ReadStrategy, db_err};
use super::{post_reader, post_writer, tag_registry, user_store};

/// Options shared by the repositories, taken from [`DatabaseConfig`].
#[derive(Debug, Clone, Copy)]
pub struct RepositoryOptions {
    pub atomic_mutations: bool,
    pub read_strategy: ReadStrategy,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            atomic_mutations: true,
            read_strategy: ReadStrategy::PerPost,
        }
    }
}

impl From<&DatabaseConfig> for RepositoryOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            atomic_mutations: config.atomic_mutations,
            read_strategy: config.read_strategy,
        }
    }
}

/// Commit on success, roll back on failure. The step's own error wins over a rollback error.
async fn finish<T>(txn: DatabaseTransaction, result: Result<T, RepoError>) -> Result<T, RepoError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(db_err)?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Mutation failed, rolling back");
            if let Err(rollback) = txn.rollback().await {
                tracing::error!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// PostgreSQL tag registry.
#[derive(Clone)]
pub struct PostgresTagRepository {
    db: DbConn,
}

impl PostgresTagRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn register(&self, names: &[String]) -> Result<Vec<Tag>, RepoError> {
        tag_registry::register(&self.db, names).await
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        tag_registry::list_all(&self.db).await
    }
}

/// PostgreSQL post repository.
#[derive(Clone)]
pub struct PostgresPostRepository {
    db: DbConn,
    options: RepositoryOptions,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self::with_options(db, RepositoryOptions::default())
    }

    pub fn with_options(db: DbConn, options: RepositoryOptions) -> Self {
        Self { db, options }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn get_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        post_reader::get_by_id(&self.db, id).await
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        post_reader::list_all(&self.db, self.options.read_strategy).await
    }

    async fn list_by_author(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        post_reader::list_by_author(&self.db, user_id, self.options.read_strategy).await
    }

    async fn list_by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, RepoError> {
        post_reader::list_by_tag_name(&self.db, tag_name, self.options.read_strategy).await
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        tracing::debug!(author_id = post.author_id, "Creating post");

        if !self.options.atomic_mutations {
            return post_writer::create(&self.db, post).await;
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let result = post_writer::create(&txn, post).await;
        finish(txn, result).await
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        tracing::debug!(post_id = id, tags_present = changes.tags.is_some(), "Updating post");

        if !self.options.atomic_mutations {
            return post_writer::update(&self.db, id, changes).await;
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let result = post_writer::update(&txn, id, changes).await;
        finish(txn, result).await
    }
}

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DbConn,
    passwords: Arc<dyn PasswordService>,
    options: RepositoryOptions,
}

impl PostgresUserRepository {
    /// Passwords are stored as given until a hasher is configured with [`Self::with_passwords`].
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            passwords: Arc::new(PlainPasswords),
            options: RepositoryOptions::default(),
        }
    }

    pub fn with_passwords(mut self, passwords: Arc<dyn PasswordService>) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn with_options(mut self, options: RepositoryOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<Option<User>, RepoError> {
        user_store::create(&self.db, self.passwords.as_ref(), user).await
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, RepoError> {
        user_store::update(&self.db, self.passwords.as_ref(), id, changes).await
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        user_store::list(&self.db).await
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        user_store::get_by_id(&self.db, id, self.options.read_strategy).await
    }
}
