//! Post-tag linker - maintains the `post_tags` join rows for one post.

use futures::future::try_join_all;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use juicebox_core::domain::Tag;
use juicebox_core::error::RepoError;

use super::db_err;
use super::entity::post_tag;

/// Link every tag to the post. Pairs that already exist are left alone.
///
/// One insert per tag, all in flight at once; the first failure fails the call.
pub async fn link<C>(db: &C, post_id: i32, tags: &[Tag]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    if tags.is_empty() {
        return Ok(());
    }

    let attempts = tags.iter().map(|tag| {
        post_tag::Entity::insert(post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag.id),
        })
        .on_conflict(
            OnConflict::columns([post_tag::Column::PostId, post_tag::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
    });

    let created: u64 = try_join_all(attempts)
        .await
        .map_err(db_err)?
        .into_iter()
        .sum();

    tracing::debug!(post_id, requested = tags.len(), created, "Linked tags to post");
    Ok(())
}

/// Make the post's tags exactly `desired`: drop every other link, then add the missing ones.
///
/// An empty `desired` strips all tags from the post.
pub async fn reconcile<C>(db: &C, post_id: i32, desired: &[Tag]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    let mut stale = post_tag::Entity::delete_many().filter(post_tag::Column::PostId.eq(post_id));
    if !desired.is_empty() {
        stale = stale.filter(post_tag::Column::TagId.is_not_in(desired.iter().map(|t| t.id)));
    }

    let removed = stale.exec(db).await.map_err(db_err)?.rows_affected;
    tracing::debug!(post_id, removed, desired = desired.len(), "Removed stale tag links");

    link(db, post_id, desired).await
}
