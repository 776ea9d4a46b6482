//! User API 模块

mod handler;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Public: register / login
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        // Admin: user listing
        .route(
            "/",
            get(handler::list).layer(axum_middleware::from_fn(require_admin)),
        )
        // Protected: single-user management (role/delete rules in handlers)
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
