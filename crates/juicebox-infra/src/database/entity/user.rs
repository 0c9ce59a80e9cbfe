//! User entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{FromQueryResult, QuerySelect, Select};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Author columns embedded in a post aggregate.
#[derive(Debug, Clone, FromQueryResult)]
pub struct AuthorRow {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
}

/// Public user columns; everything but the password.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ProfileRow {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

/// `SELECT id, username, name, location FROM users`
pub fn select_authors() -> Select<Entity> {
    Entity::find().select_only().columns([
        Column::Id,
        Column::Username,
        Column::Name,
        Column::Location,
    ])
}

/// `SELECT id, username, name, location, active FROM users`
pub fn select_profiles() -> Select<Entity> {
    Entity::find().select_only().columns([
        Column::Id,
        Column::Username,
        Column::Name,
        Column::Location,
        Column::Active,
    ])
}

impl From<AuthorRow> for juicebox_core::domain::Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            name: row.name,
            location: row.location,
        }
    }
}

impl From<ProfileRow> for juicebox_core::domain::User {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            name: row.name,
            location: row.location,
            active: row.active,
            posts: None,
        }
    }
}
