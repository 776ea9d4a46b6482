//! Order API 模块

mod handler;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::place))
        // 删除在 handler 内做管理员检查 (与 GET 共用路径)
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        // 状态流转仅管理员
        .route(
            "/{id}/status",
            put(handler::update_status).layer(axum_middleware::from_fn(require_admin)),
        )
}
