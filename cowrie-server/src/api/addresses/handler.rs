//! Address API Handlers
//!
//! 属主或管理员可访问；403 与 404 严格区分

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::api::convert::principal_id;
use crate::auth::{CurrentUser, ensure_owner};
use crate::core::ServerState;
use crate::db::models::{Address, AddressCreate, AddressUpdate};
use crate::db::repository::AddressRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/addresses - 当前用户地址；管理员可见全部
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Address>>>> {
    let repo = AddressRepository::new(state.db.clone());
    let addresses = if user.is_admin() {
        repo.find_all().await?
    } else {
        repo.find_by_user(&principal_id(&user)?).await?
    };
    Ok(ok(addresses))
}

/// GET /api/addresses/:id - 获取单个地址
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Address>>> {
    let repo = AddressRepository::new(state.db.clone());
    let address = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Address {} not found", id)))?;

    ensure_owner(&user, &address.user)?;

    Ok(ok(address))
}

/// POST /api/addresses - 创建地址
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddressCreate>,
) -> AppResult<Json<AppResponse<Address>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = AddressRepository::new(state.db.clone());
    let address = repo.create(principal_id(&user)?, payload).await?;
    Ok(ok(address))
}

/// PUT /api/addresses/:id - 更新地址
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AddressUpdate>,
) -> AppResult<Json<AppResponse<Address>>> {
    let repo = AddressRepository::new(state.db.clone());
    let address = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Address {} not found", id)))?;

    ensure_owner(&user, &address.user)?;

    let updated = repo.update(&id, payload).await?;
    Ok(ok(updated))
}

/// DELETE /api/addresses/:id - 删除地址
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let repo = AddressRepository::new(state.db.clone());
    let address = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Address {} not found", id)))?;

    ensure_owner(&user, &address.user)?;

    repo.delete(&id).await?;
    Ok(ok(true))
}
