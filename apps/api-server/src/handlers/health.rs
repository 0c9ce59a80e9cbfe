//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// GET /api/health
///
/// Reports `degraded` with 503 when the tag table cannot be read.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage_ok = state.tags.list_all().await.is_ok();

    let response = HealthResponse {
        status: if storage_ok { "ok" } else { "degraded" },
        storage: if storage_ok { "reachable" } else { "unreachable" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if storage_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
