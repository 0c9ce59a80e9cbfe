use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, PostChanges, Tag, User, UserChanges};
use crate::error::RepoError;

/// Tag registry.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Ensure every name exists exactly once and return the canonical rows.
    ///
    /// Duplicates in `names` collapse to one record. An empty slice returns an
    /// empty list without touching storage.
    async fn register(&self, names: &[String]) -> Result<Vec<Tag>, RepoError>;

    /// Every stored tag.
    async fn list_all(&self) -> Result<Vec<Tag>, RepoError>;
}

/// Post aggregate reads and writes.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Assemble a post with its author and tags. `None` if the post does not exist.
    async fn get_by_id(&self, id: i32) -> Result<Option<Post>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    async fn list_by_author(&self, user_id: i32) -> Result<Vec<Post>, RepoError>;

    async fn list_by_tag_name(&self, tag_name: &str) -> Result<Vec<Post>, RepoError>;

    /// Insert a post, register and link its tags, and return the aggregate.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Apply `changes` and return the aggregate afterwards.
    ///
    /// Fails with `NotFound` if the post does not exist.
    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;
}

/// User store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a user. `None` if the username is already taken.
    async fn create(&self, user: NewUser) -> Result<Option<User>, RepoError>;

    /// Update the given columns. `None` if `changes` is empty.
    async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>, RepoError>;

    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Fetch a user together with their posts.
    async fn get_by_id(&self, id: i32) -> Result<Option<User>, RepoError>;
}
