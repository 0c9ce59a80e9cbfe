//! User store - user rows and their public projection.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use juicebox_core::domain::{NewUser, User, UserChanges};
use juicebox_core::error::RepoError;
use juicebox_core::ports::PasswordService;

use super::entity::user;
use super::{ReadStrategy, db_err, post_reader};

/// Insert a user unless the username is taken, in which case nothing changes and `None` comes back.
pub async fn create<C>(
    db: &C,
    passwords: &dyn PasswordService,
    input: NewUser,
) -> Result<Option<User>, RepoError>
where
    C: ConnectionTrait,
{
    let row = user::ActiveModel {
        username: Set(input.username.clone()),
        password: Set(passwords.hash(&input.password)?),
        name: Set(input.name),
        location: Set(input.location),
        active: Set(true),
        ..Default::default()
    };

    let inserted = user::Entity::insert(row)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
        .map_err(db_err)?;

    if inserted == 0 {
        tracing::debug!(username = %input.username, "Username already taken");
        return Ok(None);
    }

    let created = user::select_profiles()
        .filter(user::Column::Username.eq(input.username.as_str()))
        .into_model::<user::ProfileRow>()
        .one(db)
        .await
        .map_err(db_err)?;

    Ok(created.map(Into::into))
}

/// Write the given columns. Empty `changes` is a no-op returning `None`.
pub async fn update<C>(
    db: &C,
    passwords: &dyn PasswordService,
    id: i32,
    changes: UserChanges,
) -> Result<Option<User>, RepoError>
where
    C: ConnectionTrait,
{
    if changes.is_empty() {
        return Ok(None);
    }

    let mut columns = user::ActiveModel {
        ..Default::default()
    };
    if let Some(username) = changes.username {
        columns.username = Set(username);
    }
    if let Some(password) = changes.password {
        columns.password = Set(passwords.hash(&password)?);
    }
    if let Some(name) = changes.name {
        columns.name = Set(name);
    }
    if let Some(location) = changes.location {
        columns.location = Set(location);
    }
    if let Some(active) = changes.active {
        columns.active = Set(active);
    }

    let result = user::Entity::update_many()
        .set(columns)
        .filter(user::Column::Id.eq(id))
        .exec(db)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Err(RepoError::not_found("User", id));
    }
    tracing::debug!(user_id = id, "Updated user columns");

    profile(db, id)
        .await?
        .map(Some)
        .ok_or_else(|| RepoError::not_found("User", id))
}

/// Public fields of every user.
pub async fn list<C>(db: &C) -> Result<Vec<User>, RepoError>
where
    C: ConnectionTrait,
{
    let rows = user::select_profiles()
        .order_by_asc(user::Column::Id)
        .into_model::<user::ProfileRow>()
        .all(db)
        .await
        .map_err(db_err)?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// The user's public fields plus all of their posts. A user without posts gets an empty list.
pub async fn get_by_id<C>(
    db: &C,
    id: i32,
    strategy: ReadStrategy,
) -> Result<Option<User>, RepoError>
where
    C: ConnectionTrait,
{
    let Some(mut user) = profile(db, id).await? else {
        return Ok(None);
    };

    user.posts = Some(post_reader::list_by_author(db, id, strategy).await?);
    Ok(Some(user))
}

async fn profile<C>(db: &C, id: i32) -> Result<Option<User>, RepoError>
where
    C: ConnectionTrait,
{
    let row = user::select_profiles()
        .filter(user::Column::Id.eq(id))
        .into_model::<user::ProfileRow>()
        .one(db)
        .await
        .map_err(db_err)?;

    Ok(row.map(Into::into))
}
