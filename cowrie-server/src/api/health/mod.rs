//! Health API 模块

use axum::{Json, Router, routing::get};

use crate::core::ServerState;
use crate::utils::AppResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health - 存活检查
async fn health() -> Json<AppResponse<()>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "API is running".to_string(),
        data: None,
    })
}
