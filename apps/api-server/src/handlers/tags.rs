//! Tag handlers.

use actix_web::{HttpResponse, web};

use juicebox_shared::ApiResponse;

use super::visible;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/tags
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.tags.list_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(tags)))
}

/// GET /api/tags/{tag_name}/posts
pub async fn posts(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let tag_name = path.into_inner();
    tracing::debug!(tag = %tag_name, "Listing posts by tag");

    let posts = visible(state.posts.list_by_tag_name(&tag_name).await?);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}
