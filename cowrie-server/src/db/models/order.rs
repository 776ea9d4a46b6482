//! Order Model
//!
//! Order/OrderItem 由下单流程一次性创建；此后仅 status 字段可变，
//! `price_at_purchase` 固定为下单时的商品单价。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order ID type
pub type OrderId = RecordId;

/// Order status enum
///
/// 三值枚举，仅做成员校验；不限制跳转顺序 (PENDING→SHIPPED 合法)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub shipping_address: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub billing_address: RecordId,
    /// 服务端计算的订单总额，不信任客户端传入
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: Option<String>,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    /// 下单时刻的商品名快照
    pub name: String,
    pub quantity: i64,
    /// 下单时刻的商品单价快照，此后商品调价不影响已有订单
    pub price_at_purchase: f64,
}

/// Order with its line items (placement/read response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Place-order payload
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub shipping_address_id: String,
    pub billing_address_id: String,
}

/// Status update payload
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("PENDING".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("PAID".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!("SHIPPED".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!("CANCELLED".parse::<OrderStatus>().is_err());
        assert!("pending".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }
}
