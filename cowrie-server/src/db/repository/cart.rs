//! Cart Repository
//!
//! 购物车按用户惰性创建 (`cart_owner` 唯一索引保证并发首访只建一只)；
//! 行项目按 (cart, product) 唯一。

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Cart, CartItem, CartItemWithCart, CartItemWithProduct};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const CART_ITEM_TABLE: &str = "cart_item";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find a user's cart
    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Option<Cart>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE user = $user LIMIT 1")
            .bind(("user", user.clone()))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    /// Get the user's cart, creating an empty one if absent
    ///
    /// 并发首访时唯一索引拒绝第二次 CREATE，重读拿到赢家创建的那只。
    pub async fn get_or_create(&self, user: &RecordId) -> RepoResult<Cart> {
        for _ in 0..2 {
            if let Some(cart) = self.find_by_user(user).await? {
                return Ok(cart);
            }

            let created = self
                .base
                .db()
                .query("CREATE cart SET user = $user RETURN AFTER")
                .bind(("user", user.clone()))
                .await
                .and_then(|mut r| r.take::<Vec<Cart>>(0));

            match created {
                Ok(carts) => {
                    if let Some(cart) = carts.into_iter().next() {
                        return Ok(cart);
                    }
                }
                // Lost the creation race - loop around and read the winner's cart
                Err(_) => continue,
            }
        }

        self.find_by_user(user)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create cart".to_string()))
    }

    /// List cart line items, oldest first
    pub async fn list_items(&self, cart: &RecordId) -> RepoResult<Vec<CartItem>> {
        let items: Vec<CartItem> = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE cart = $cart ORDER BY created_at")
            .bind(("cart", cart.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// List cart line items with the product record fetched (live price/stock)
    ///
    /// 行序 = 加入购物车的先后，下单预留按此顺序进行
    pub async fn list_items_with_products(
        &self,
        cart: &RecordId,
    ) -> RepoResult<Vec<CartItemWithProduct>> {
        let items: Vec<CartItemWithProduct> = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE cart = $cart ORDER BY created_at FETCH product")
            .bind(("cart", cart.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find a cart line item with its owning cart fetched (for ownership checks)
    pub async fn find_item(&self, id: &str) -> RepoResult<Option<CartItemWithCart>> {
        let thing = record_id(CART_ITEM_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE id = $id FETCH cart")
            .bind(("id", thing))
            .await?;
        let items: Vec<CartItemWithCart> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Find the line for (cart, product), if any
    pub async fn find_line(
        &self,
        cart: &RecordId,
        product: &RecordId,
    ) -> RepoResult<Option<CartItem>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart_item WHERE cart = $cart AND product = $product LIMIT 1")
            .bind(("cart", cart.clone()))
            .bind(("product", product.clone()))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Create a new cart line
    pub async fn create_item(
        &self,
        cart: &RecordId,
        product: &RecordId,
        quantity: i64,
    ) -> RepoResult<CartItem> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE cart_item SET
                    cart = $cart,
                    product = $product,
                    quantity = $quantity,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("cart", cart.clone()))
            .bind(("product", product.clone()))
            .bind(("quantity", quantity))
            .bind(("created_at", created_at))
            .await?;

        let created: Option<CartItem> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create cart item".to_string()))
    }

    /// Set the quantity of an existing line
    pub async fn set_item_quantity(&self, item: &RecordId, quantity: i64) -> RepoResult<CartItem> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $item SET quantity = $quantity RETURN AFTER")
            .bind(("item", item.clone()))
            .bind(("quantity", quantity))
            .await?;
        let items: Vec<CartItem> = result.take(0)?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Cart item {} not found", item)))
    }

    /// Remove a single line
    pub async fn delete_item(&self, item: &RecordId) -> RepoResult<()> {
        let deleted: Option<CartItem> = self.base.db().delete(item.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Cart item {} not found", item)));
        }
        Ok(())
    }

    /// Delete every line of a cart (the cart record itself persists)
    pub async fn clear(&self, cart: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE cart_item WHERE cart = $cart")
            .bind(("cart", cart.clone()))
            .await?
            .check()?;
        Ok(())
    }
}
