//! Post aggregate reader - rebuilds posts with their author and tags from normalized rows.

use std::collections::{BTreeSet, HashMap};

use futures::future::try_join_all;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait,
    Select,
};

use juicebox_core::domain::{Author, Post, Tag};
use juicebox_core::error::RepoError;

use super::ReadStrategy;
use super::db_err;
use super::entity::{post, post_tag, tag, user};

/// Assemble one post. `None` if the post row does not exist.
///
/// The tag and author lookups only depend on the post row and run concurrently.
pub async fn get_by_id<C>(db: &C, post_id: i32) -> Result<Option<Post>, RepoError>
where
    C: ConnectionTrait,
{
    let Some(row) = post::Entity::find_by_id(post_id)
        .one(db)
        .await
        .map_err(db_err)?
    else {
        return Ok(None);
    };

    let (tags, author) = futures::try_join!(tags_of(db, row.id), author_of(db, row.author_id))?;

    Ok(Some(assemble(row, author, tags)))
}

pub async fn list_all<C>(db: &C, strategy: ReadStrategy) -> Result<Vec<Post>, RepoError>
where
    C: ConnectionTrait,
{
    load(db, post::Entity::find(), strategy).await
}

pub async fn list_by_author<C>(
    db: &C,
    user_id: i32,
    strategy: ReadStrategy,
) -> Result<Vec<Post>, RepoError>
where
    C: ConnectionTrait,
{
    let query = post::Entity::find().filter(post::Column::AuthorId.eq(user_id));
    load(db, query, strategy).await
}

pub async fn list_by_tag_name<C>(
    db: &C,
    tag_name: &str,
    strategy: ReadStrategy,
) -> Result<Vec<Post>, RepoError>
where
    C: ConnectionTrait,
{
    let query = post::Entity::find()
        .join(JoinType::InnerJoin, post::Relation::PostTag.def())
        .join(JoinType::InnerJoin, post_tag::Relation::Tag.def())
        .filter(tag::Column::Name.eq(tag_name));
    load(db, query, strategy).await
}

async fn load<C>(
    db: &C,
    query: Select<post::Entity>,
    strategy: ReadStrategy,
) -> Result<Vec<Post>, RepoError>
where
    C: ConnectionTrait,
{
    match strategy {
        ReadStrategy::PerPost => {
            let ids: Vec<i32> = query
                .select_only()
                .column(post::Column::Id)
                .into_tuple()
                .all(db)
                .await
                .map_err(db_err)?;
            assemble_each(db, ids).await
        }
        ReadStrategy::Batched => {
            let rows = query.all(db).await.map_err(db_err)?;
            assemble_batched(db, rows).await
        }
    }
}

async fn assemble_each<C>(db: &C, ids: Vec<i32>) -> Result<Vec<Post>, RepoError>
where
    C: ConnectionTrait,
{
    tracing::debug!(count = ids.len(), "Assembling posts one by one");

    let posts = try_join_all(ids.into_iter().map(|id| get_by_id(db, id))).await?;

    // Ids whose row disappeared mid-read are skipped.
    Ok(posts.into_iter().flatten().collect())
}

/// Three queries regardless of how many posts: the links with their tags, and the authors.
async fn assemble_batched<C>(db: &C, rows: Vec<post::Model>) -> Result<Vec<Post>, RepoError>
where
    C: ConnectionTrait,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    tracing::debug!(count = rows.len(), "Assembling posts in batch");

    let post_ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
    let author_ids: BTreeSet<i32> = rows.iter().map(|p| p.author_id).collect();

    let links = async {
        post_tag::Entity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids))
            .find_also_related(tag::Entity)
            .all(db)
            .await
            .map_err(db_err)
    };
    let authors = async {
        user::select_authors()
            .filter(user::Column::Id.is_in(author_ids))
            .into_model::<user::AuthorRow>()
            .all(db)
            .await
            .map_err(db_err)
    };
    let (links, authors) = futures::try_join!(links, authors)?;

    let mut tags_by_post: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            tags_by_post.entry(link.post_id).or_default().push(tag.into());
        }
    }
    let authors: HashMap<i32, Author> = authors.into_iter().map(|a| (a.id, a.into())).collect();

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| missing_author(row.id, row.author_id))?;
            let tags = tags_by_post.remove(&row.id).unwrap_or_default();
            Ok(assemble(row, author, tags))
        })
        .collect()
}

async fn tags_of<C>(db: &C, post_id: i32) -> Result<Vec<Tag>, RepoError>
where
    C: ConnectionTrait,
{
    let tags = tag::Entity::find()
        .join(JoinType::InnerJoin, tag::Relation::PostTag.def())
        .filter(post_tag::Column::PostId.eq(post_id))
        .all(db)
        .await
        .map_err(db_err)?;

    Ok(tags.into_iter().map(Into::into).collect())
}

async fn author_of<C>(db: &C, author_id: i32) -> Result<Author, RepoError>
where
    C: ConnectionTrait,
{
    user::select_authors()
        .filter(user::Column::Id.eq(author_id))
        .into_model::<user::AuthorRow>()
        .one(db)
        .await
        .map_err(db_err)?
        .map(Into::into)
        .ok_or_else(|| RepoError::Integrity(format!("author {author_id} does not exist")))
}

fn missing_author(post_id: i32, author_id: i32) -> RepoError {
    RepoError::Integrity(format!(
        "post {post_id} references missing author {author_id}"
    ))
}

fn assemble(row: post::Model, author: Author, tags: Vec<Tag>) -> Post {
    Post {
        id: row.id,
        title: row.title,
        content: row.content,
        active: row.active,
        author,
        tags,
    }
}
