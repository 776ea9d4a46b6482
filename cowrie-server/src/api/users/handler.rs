//! User API Handlers
//!
//! Handles registration, login, and user management

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AuthResponse, LoginRequest, User, UserCreate, UserUpdate};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// POST /api/users/register - 注册新用户
///
/// 角色缺省为 CUSTOMER；返回用户信息和 JWT
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.create(payload).await?;

    let token = issue_token(&state, &user)?;

    tracing::info!(email = %user.email, "User registered");

    Ok(ok(AuthResponse { user, token }))
}

/// POST /api/users/login - 登录
///
/// 统一的凭证错误消息，防止邮箱枚举
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<AuthResponse>>> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Please provide email and password"));
    }

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let password_valid = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        tracing::warn!(email = %payload.email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = issue_token(&state, &user)?;

    tracing::info!(email = %user.email, role = %user.role, "User logged in");

    Ok(ok(AuthResponse { user, token }))
}

/// GET /api/users - 用户列表 (仅管理员，路由层校验)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<User>>>> {
    let repo = UserRepository::new(state.db.clone());
    let users = repo.find_all().await?;
    Ok(ok(users))
}

/// GET /api/users/:id - 获取单个用户
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<User>>> {
    let repo = UserRepository::new(state.db.clone());
    let found = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))?;
    Ok(ok(found))
}

/// PUT /api/users/:id - 更新用户
///
/// 角色字段仅管理员可改
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<AppResponse<User>>> {
    if payload.role.is_some() && !user.is_admin() {
        return Err(AppError::forbidden(
            "Only admin can change user role".to_string(),
        ));
    }

    let repo = UserRepository::new(state.db.clone());
    let updated = repo.update(&id, payload).await?;
    Ok(ok(updated))
}

/// DELETE /api/users/:id - 删除用户 (仅管理员)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Admin access required".to_string()));
    }

    let repo = UserRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(ok(true))
}

fn issue_token(state: &ServerState, user: &User) -> Result<String, AppError> {
    let user_id = user
        .id
        .as_ref()
        .map(|t| t.to_string())
        .ok_or_else(|| AppError::internal("User has no ID".to_string()))?;

    state
        .get_jwt_service()
        .generate_token(&user_id, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
}
