//! Cart API Handlers
//!
//! 购物车按用户惰性创建；行项目按 (cart, product) 唯一，
//! 重复添加走数量累加并复查库存。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use validator::Validate;

use crate::api::convert::principal_id;
use crate::auth::{CurrentUser, ensure_owner};
use crate::checkout::money;
use crate::core::ServerState;
use crate::db::models::{Cart, CartItem, CartItemCreate, CartItemUpdate, CartItemWithProduct};
use crate::db::repository::{CartRepository, ProductRepository, record_id};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

/// Cart view: cart + lines + running total
#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItemWithProduct>,
    pub total: f64,
}

/// GET /api/carts - 当前用户的购物车 (不存在则创建空车)
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<CartView>>> {
    let repo = CartRepository::new(state.db.clone());
    let cart = repo.get_or_create(&principal_id(&user)?).await?;
    let cart_id = cart
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Cart has no ID".to_string()))?;

    let items = repo.list_items_with_products(&cart_id).await?;
    let total = money::order_total(&items);

    Ok(ok(CartView { cart, items, total }))
}

/// POST /api/carts/items - 加入商品
///
/// 已有同商品行时累加数量；合并后的数量再次与库存比对
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CartItemCreate>,
) -> AppResult<Json<AppResponse<CartItem>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&payload.product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", payload.product_id)))?;
    let product_id = record_id("product", &payload.product_id)?;

    let carts = CartRepository::new(state.db.clone());
    let cart = carts.get_or_create(&principal_id(&user)?).await?;
    let cart_id = cart
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Cart has no ID".to_string()))?;

    // Merge into the existing line if present
    let item = match carts.find_line(&cart_id, &product_id).await? {
        Some(existing) => {
            let merged = existing.quantity + payload.quantity;
            if product.stock_quantity < merged {
                return Err(AppError::business_rule(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }
            let item_id = existing
                .id
                .ok_or_else(|| AppError::internal("Cart item has no ID".to_string()))?;
            carts.set_item_quantity(&item_id, merged).await?
        }
        None => {
            if product.stock_quantity < payload.quantity {
                return Err(AppError::business_rule(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }
            carts
                .create_item(&cart_id, &product_id, payload.quantity)
                .await?
        }
    };

    Ok(ok(item))
}

/// PUT /api/carts/items/:id - 修改行项目数量
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CartItemUpdate>,
) -> AppResult<Json<AppResponse<CartItem>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let carts = CartRepository::new(state.db.clone());
    let item = carts
        .find_item(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart item {} not found", id)))?;

    ensure_owner(&user, &item.cart.user)?;

    // Stock check against the requested quantity
    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&item.product.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Product not found".to_string()))?;

    if product.stock_quantity < payload.quantity {
        return Err(AppError::business_rule(format!(
            "Insufficient stock for {}",
            product.name
        )));
    }

    let item_id = item
        .id
        .ok_or_else(|| AppError::internal("Cart item has no ID".to_string()))?;
    let updated = carts.set_item_quantity(&item_id, payload.quantity).await?;

    Ok(ok(updated))
}

/// DELETE /api/carts/items/:id - 移除行项目
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<bool>>> {
    let carts = CartRepository::new(state.db.clone());
    let item = carts
        .find_item(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart item {} not found", id)))?;

    ensure_owner(&user, &item.cart.user)?;

    let item_id = item
        .id
        .ok_or_else(|| AppError::internal("Cart item has no ID".to_string()))?;
    carts.delete_item(&item_id).await?;

    Ok(ok_with_message(true, "Item removed from cart"))
}

/// DELETE /api/carts - 清空购物车 (购物车记录保留)
pub async fn clear(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<bool>>> {
    let carts = CartRepository::new(state.db.clone());
    if let Some(cart) = carts.find_by_user(&principal_id(&user)?).await? {
        let cart_id = cart
            .id
            .ok_or_else(|| AppError::internal("Cart has no ID".to_string()))?;
        carts.clear(&cart_id).await?;
    }
    Ok(ok_with_message(true, "Cart cleared"))
}
