//! Order Repository
//!
//! Order/OrderItem 行由下单流程 (checkout::CheckoutService) 一次性写入；
//! 此后除 status 外不再修改。

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Order, OrderDetail, OrderItem, OrderStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all orders, newest first (admin view)
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find a user's orders, newest first
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = record_id(ORDER_TABLE, id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// List the line items of an order
    pub async fn list_items(&self, order: &RecordId) -> RepoResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order = $order")
            .bind(("order", order.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find order with its line items
    pub async fn find_detail(&self, id: &str) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Order has no ID".to_string()))?;
        let items = self.list_items(&order_id).await?;
        Ok(Some(OrderDetail { order, items }))
    }

    /// Create the order record (status PENDING)
    pub async fn create(
        &self,
        user: &RecordId,
        shipping_address: &RecordId,
        billing_address: &RecordId,
        total_amount: f64,
    ) -> RepoResult<Order> {
        let created_at = chrono::Utc::now().to_rfc3339();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE order SET
                    user = $user,
                    shipping_address = $shipping_address,
                    billing_address = $billing_address,
                    total_amount = $total_amount,
                    status = $status,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("user", user.clone()))
            .bind(("shipping_address", shipping_address.clone()))
            .bind(("billing_address", billing_address.clone()))
            .bind(("total_amount", total_amount))
            .bind(("status", OrderStatus::Pending))
            .bind(("created_at", created_at))
            .await?;

        let created: Option<Order> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Create one order line item with its price snapshot
    pub async fn create_item(
        &self,
        order: &RecordId,
        product: &RecordId,
        name: String,
        quantity: i64,
        price_at_purchase: f64,
    ) -> RepoResult<OrderItem> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE order_item SET
                    order = $order,
                    product = $product,
                    name = $name,
                    quantity = $quantity,
                    price_at_purchase = $price_at_purchase
                RETURN AFTER"#,
            )
            .bind(("order", order.clone()))
            .bind(("product", product.clone()))
            .bind(("name", name))
            .bind(("quantity", quantity))
            .bind(("price_at_purchase", price_at_purchase))
            .await?;

        let created: Option<OrderItem> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create order item".to_string()))
    }

    /// Update order status (membership of the enum is the only check)
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        let thing = record_id(ORDER_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status RETURN AFTER")
            .bind(("thing", thing))
            .bind(("status", status))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Hard delete an order together with its line items
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = record_id(ORDER_TABLE, id)?;

        // Clean up line items first
        self.base
            .db()
            .query("DELETE order_item WHERE order = $order")
            .bind(("order", thing.clone()))
            .await?
            .check()?;

        let deleted: Option<Order> = self.base.db().delete(thing).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Order {} not found", id)));
        }
        Ok(())
    }
}
