//! Cart and Cart Item Models

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::Product;
use super::serde_helpers;

/// Cart ID type
pub type CartId = RecordId;

/// Cart model - 每用户一个，首次访问时惰性创建
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CartId>,
    /// Record link to owning user (unique index `cart_owner`)
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
}

/// Cart line item - (cart, product) 唯一，重复添加走数量累加
///
/// `created_at` 决定行顺序：快照与库存预留按加入购物车的先后进行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub cart: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
    pub created_at: Option<String>,
}

/// Cart line item with the product record fetched
///
/// 快照读取时使用：携带读取时刻的商品单价与库存。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemWithProduct {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub cart: RecordId,
    pub product: Product,
    pub quantity: i64,
    pub created_at: Option<String>,
}

/// Cart line item with the owning cart fetched (for ownership checks)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemWithCart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub cart: Cart,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
    pub created_at: Option<String>,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItemCreate {
    /// "product:xxx" 格式
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

/// Update cart item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItemUpdate {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}
