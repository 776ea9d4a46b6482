//! Cart Snapshot Reader
//!
//! 购物车的时点读取：行项目携带读取时刻的商品单价与库存。
//! 后续计总与 `price_at_purchase` 都以快照为准，不再重读。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::checkout::error::CheckoutError;
use crate::db::models::{Cart, CartItemWithProduct};
use crate::db::repository::{CartRepository, RepoError};

/// Point-in-time view of a user's cart
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub cart: Cart,
    pub lines: Vec<CartItemWithProduct>,
}

/// Snapshot reader over the cart store
#[derive(Clone)]
pub struct SnapshotReader {
    carts: CartRepository,
}

impl SnapshotReader {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            carts: CartRepository::new(db),
        }
    }

    /// Take the snapshot for `user`
    ///
    /// 购物车不存在时惰性创建 (这不是错误)；没有行项目时返回
    /// [`CheckoutError::EmptyCart`]。
    pub async fn snapshot(&self, user: &RecordId) -> Result<CartSnapshot, CheckoutError> {
        let cart = self.carts.get_or_create(user).await?;
        let cart_id = cart
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Cart has no ID".to_string()))?;

        let lines = self.carts.list_items_with_products(&cart_id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(CartSnapshot { cart, lines })
    }
}
