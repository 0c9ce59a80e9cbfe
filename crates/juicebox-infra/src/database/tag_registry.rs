//! Tag registry - lazily creates tags and resolves their canonical rows.

use std::collections::BTreeSet;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use juicebox_core::domain::Tag;
use juicebox_core::error::RepoError;

use super::db_err;
use super::entity::tag;

/// Ensure every name in `names` exists and return one canonical row per distinct name.
///
/// Names another writer inserted first hit the unique constraint and are skipped;
/// the lookup afterwards returns their existing rows.
pub async fn register<C>(db: &C, names: &[String]) -> Result<Vec<Tag>, RepoError>
where
    C: ConnectionTrait,
{
    let distinct: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    if distinct.is_empty() {
        return Ok(Vec::new());
    }

    let rows = distinct.iter().map(|name| tag::ActiveModel {
        name: Set((*name).to_owned()),
        ..Default::default()
    });

    let inserted = tag::Entity::insert_many(rows)
        .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await
        .map_err(db_err)?;

    let tags = tag::Entity::find()
        .filter(tag::Column::Name.is_in(distinct.iter().copied()))
        .all(db)
        .await
        .map_err(db_err)?;

    tracing::debug!(
        requested = distinct.len(),
        inserted,
        resolved = tags.len(),
        "Registered tags"
    );

    Ok(tags.into_iter().map(Into::into).collect())
}

/// Every stored tag, by name.
pub async fn list_all<C>(db: &C) -> Result<Vec<Tag>, RepoError>
where
    C: ConnectionTrait,
{
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
        .map_err(db_err)?;

    Ok(tags.into_iter().map(Into::into).collect())
}
