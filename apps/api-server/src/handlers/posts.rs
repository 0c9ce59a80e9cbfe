//! Post handlers.

use actix_web::{HttpResponse, web};

use juicebox_core::domain::{NewPost, PostChanges};
use juicebox_shared::ApiResponse;
use juicebox_shared::dto::{CreatePostRequest, UpdatePostRequest};

use super::visible;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = visible(state.posts.list_all().await?);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(NewPost {
            author_id: req.author_id,
            title: req.title,
            content: req.content,
            tags: req.tags,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        content: req.content,
        active: req.active,
        tags: req.tags,
    };

    let post = state.posts.update(path.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}
