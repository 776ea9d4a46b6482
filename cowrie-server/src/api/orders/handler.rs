//! Order API Handlers
//!
//! 下单走 checkout::CheckoutService (库存预留 + 补偿回滚)；
//! 读取与状态流转在此处理。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::convert::principal_id;
use crate::auth::{CurrentUser, ensure_owner};
use crate::checkout::CheckoutService;
use crate::core::ServerState;
use crate::db::models::{
    Order, OrderDetail, OrderStatus, PlaceOrderRequest, StatusUpdateRequest,
};
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/orders - 当前用户订单；管理员可见全部 (新单在前)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = if user.is_admin() {
        repo.find_all().await?
    } else {
        repo.find_by_user(&principal_id(&user)?).await?
    };
    Ok(ok(orders))
}

/// GET /api/orders/:id - 订单详情 (含行项目)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let repo = OrderRepository::new(state.db.clone());
    let detail = repo
        .find_detail(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    ensure_owner(&user, &detail.order.user)?;

    Ok(ok(detail))
}

/// POST /api/orders - 从购物车下单
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    if payload.shipping_address_id.is_empty() || payload.billing_address_id.is_empty() {
        return Err(AppError::validation(
            "Shipping and billing addresses are required",
        ));
    }

    let checkout = CheckoutService::new(state.db.clone());
    let detail = checkout
        .place_order(
            &principal_id(&user)?,
            &payload.shipping_address_id,
            &payload.billing_address_id,
        )
        .await?;

    Ok(ok(detail))
}

/// PUT /api/orders/:id/status - 更新订单状态 (仅管理员)
///
/// 仅校验三值枚举成员资格，不限制跳转顺序
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let status: OrderStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::validation("Invalid status"))?;

    let repo = OrderRepository::new(state.db.clone());
    let order = repo.update_status(&id, status).await?;
    Ok(ok(order))
}

/// DELETE /api/orders/:id - 删除订单及行项目 (仅管理员)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Admin access required".to_string()));
    }

    let repo = OrderRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(ok(true))
}
