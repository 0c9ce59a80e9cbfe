//! User handlers.

use actix_web::{HttpResponse, web};

use juicebox_core::domain::{NewUser, UserChanges};
use juicebox_shared::ApiResponse;
use juicebox_shared::dto::{RegisterUserRequest, UpdateUserRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.users.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(users)))
}

/// POST /api/users
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.clone();

    let created = state
        .users
        .create(NewUser {
            username: req.username,
            password: req.password,
            name: req.name,
            location: req.location,
        })
        .await?;

    match created {
        Some(user) => Ok(HttpResponse::Created().json(ApiResponse::ok(user))),
        None => Err(AppError::Conflict(format!(
            "A user by the username {} already exists",
            username
        ))),
    }
}

/// GET /api/users/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// PATCH /api/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = UserChanges {
        username: req.username,
        password: req.password,
        name: req.name,
        location: req.location,
        active: req.active,
    };

    let user = state
        .users
        .update(path.into_inner(), changes)
        .await?
        .ok_or_else(|| AppError::BadRequest("No fields to update".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}
