//! Order Assembler
//!
//! 把购物车快照装配成持久化订单：
//!
//! 1. 校验收货/账单地址存在
//! 2. 取购物车快照 (空购物车即失败)
//! 3. 按购物车顺序逐行预留库存；首个不足即整体中止并放回已预留量
//! 4. 以快照单价计算订单总额 (Decimal)
//! 5. 创建订单与行项目，`price_at_purchase` 固定为快照单价
//! 6. 清空购物车行项目 (购物车本身保留)
//!
//! 嵌入式存储没有跨文档事务，步骤 3 之后的任何失败都走补偿路径：
//! 放回全部预留、删除已建订单及行项目，再向上返回错误。库存不会
//! 无主扣减，订单不会缺行存在。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::checkout::error::CheckoutError;
use crate::checkout::ledger::InventoryLedger;
use crate::checkout::money;
use crate::checkout::snapshot::{CartSnapshot, SnapshotReader};
use crate::db::models::{OrderDetail, OrderItem};
use crate::db::repository::{
    AddressRepository, CartRepository, OrderRepository, RepoError, record_id,
};

/// Checkout service - the only writer of orders and stock
#[derive(Clone)]
pub struct CheckoutService {
    snapshots: SnapshotReader,
    ledger: InventoryLedger,
    addresses: AddressRepository,
    orders: OrderRepository,
    carts: CartRepository,
}

impl CheckoutService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            snapshots: SnapshotReader::new(db.clone()),
            ledger: InventoryLedger::new(db.clone()),
            addresses: AddressRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            carts: CartRepository::new(db),
        }
    }

    /// Take the cart snapshot for `user` (see [`SnapshotReader::snapshot`])
    pub async fn snapshot(&self, user: &RecordId) -> Result<CartSnapshot, CheckoutError> {
        self.snapshots.snapshot(user).await
    }

    /// Place an order from the user's cart
    pub async fn place_order(
        &self,
        user: &RecordId,
        shipping_address_id: &str,
        billing_address_id: &str,
    ) -> Result<OrderDetail, CheckoutError> {
        // 1. Validate address references
        let shipping = self.require_address(shipping_address_id).await?;
        let billing = self.require_address(billing_address_id).await?;

        // 2. Cart snapshot (fails with EmptyCart when there are no lines)
        let snapshot = self.snapshots.snapshot(user).await?;
        let cart_id = snapshot
            .cart
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Cart has no ID".to_string()))?;

        // 3. Reserve stock per line, in cart order
        let mut reserved: Vec<(RecordId, i64)> = Vec::new();
        for line in &snapshot.lines {
            let product_id = line
                .product
                .id
                .clone()
                .ok_or_else(|| RepoError::Database("Product has no ID".to_string()))?;

            if let Err(e) = self
                .ledger
                .reserve(&product_id, &line.product.name, line.quantity)
                .await
            {
                // First failure aborts the whole operation - no partial order
                self.release_all(&reserved).await;
                return Err(e);
            }
            reserved.push((product_id, line.quantity));
        }

        // 4. Server-side total from snapshot prices
        let total_amount = money::order_total(&snapshot.lines);

        // 5. Create order + line items with the snapshot price fixed
        let order = match self.orders.create(user, &shipping, &billing, total_amount).await {
            Ok(order) => order,
            Err(e) => {
                self.release_all(&reserved).await;
                return Err(e.into());
            }
        };
        let order_id = match order.id.clone() {
            Some(id) => id,
            None => {
                self.release_all(&reserved).await;
                return Err(RepoError::Database("Order has no ID".to_string()).into());
            }
        };

        let mut items: Vec<OrderItem> = Vec::with_capacity(snapshot.lines.len());
        for (line, (product_id, _)) in snapshot.lines.iter().zip(&reserved) {
            match self
                .orders
                .create_item(
                    &order_id,
                    product_id,
                    line.product.name.clone(),
                    line.quantity,
                    line.product.price,
                )
                .await
            {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.undo_order(&order_id, &reserved).await;
                    return Err(e.into());
                }
            }
        }

        // 6. Clear the cart (the cart record itself persists, now empty)
        if let Err(e) = self.carts.clear(&cart_id).await {
            self.undo_order(&order_id, &reserved).await;
            return Err(e.into());
        }

        tracing::info!(
            order = %order_id,
            user = %user,
            total = total_amount,
            items = items.len(),
            "Order placed"
        );

        Ok(OrderDetail { order, items })
    }

    /// Resolve and require an address record
    async fn require_address(&self, id: &str) -> Result<RecordId, CheckoutError> {
        let thing = record_id("address", id)?;
        if !self.addresses.exists(id).await? {
            return Err(CheckoutError::AddressNotFound(id.to_string()));
        }
        Ok(thing)
    }

    /// Compensation: return every reserved quantity
    async fn release_all(&self, reserved: &[(RecordId, i64)]) {
        for (product_id, quantity) in reserved {
            self.ledger.release(product_id, *quantity).await;
        }
    }

    /// Compensation: drop the partially created order and return reservations
    async fn undo_order(&self, order_id: &RecordId, reserved: &[(RecordId, i64)]) {
        if let Err(e) = self.orders.delete(&order_id.to_string()).await {
            tracing::error!(order = %order_id, error = %e, "Failed to undo partial order");
        }
        self.release_all(reserved).await;
    }
}
