//! Post writer - post row mutations plus their tag synchronization.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use juicebox_core::domain::{NewPost, Post, PostChanges};
use juicebox_core::error::RepoError;

use super::entity::post;
use super::{db_err, post_reader, post_tag_linker, tag_registry};

/// Insert the post, attach its tags and return the assembled aggregate.
pub async fn create<C>(db: &C, input: NewPost) -> Result<Post, RepoError>
where
    C: ConnectionTrait,
{
    let NewPost {
        author_id,
        title,
        content,
        tags,
    } = input;

    let row = post::ActiveModel {
        author_id: Set(author_id),
        title: Set(title),
        content: Set(content),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(db_err)?;

    tracing::debug!(post_id = row.id, author_id, tag_count = tags.len(), "Inserted post");

    if !tags.is_empty() {
        let canonical = tag_registry::register(db, &tags).await?;
        post_tag_linker::link(db, row.id, &canonical).await?;
    }

    reread(db, row.id).await
}

/// Apply `changes` to the post and return the aggregate afterwards.
///
/// Only the columns present in `changes` are written. Tags are reconciled when
/// `changes.tags` is present, even if empty.
pub async fn update<C>(db: &C, post_id: i32, changes: PostChanges) -> Result<Post, RepoError>
where
    C: ConnectionTrait,
{
    if changes.has_scalar_changes() {
        let mut columns = post::ActiveModel {
            ..Default::default()
        };
        if let Some(title) = changes.title {
            columns.title = Set(title);
        }
        if let Some(content) = changes.content {
            columns.content = Set(content);
        }
        if let Some(active) = changes.active {
            columns.active = Set(active);
        }

        let result = post::Entity::update_many()
            .set(columns)
            .filter(post::Column::Id.eq(post_id))
            .exec(db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::not_found("Post", post_id));
        }
        tracing::debug!(post_id, "Updated post columns");
    } else if changes.tags.is_some() && !exists(db, post_id).await? {
        return Err(RepoError::not_found("Post", post_id));
    }

    if let Some(names) = changes.tags {
        let desired = tag_registry::register(db, &names).await?;
        post_tag_linker::reconcile(db, post_id, &desired).await?;
    }

    reread(db, post_id).await
}

async fn exists<C>(db: &C, post_id: i32) -> Result<bool, RepoError>
where
    C: ConnectionTrait,
{
    let row = post::Entity::find_by_id(post_id)
        .one(db)
        .await
        .map_err(db_err)?;
    Ok(row.is_some())
}

async fn reread<C>(db: &C, post_id: i32) -> Result<Post, RepoError>
where
    C: ConnectionTrait,
{
    post_reader::get_by_id(db, post_id)
        .await?
        .ok_or_else(|| RepoError::not_found("Post", post_id))
}
