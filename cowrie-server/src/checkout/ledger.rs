//! Inventory Ledger
//!
//! 商品库存的唯一扣减通道。预留 = 单条条件 UPDATE 内的检查加扣减，
//! 对同一商品的并发预留是线性化的：合并量超出库存时至多一路成功。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::checkout::error::CheckoutError;
use crate::db::repository::ProductRepository;

/// Atomic reserve/release over product stock
#[derive(Clone)]
pub struct InventoryLedger {
    products: ProductRepository,
}

impl InventoryLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Reserve `quantity` units or fail with `InsufficientStock`
    ///
    /// 不做 read-then-write：检查与扣减是同一条语句 (见
    /// [`ProductRepository::reserve_stock`])。
    pub async fn reserve(
        &self,
        product_id: &RecordId,
        name: &str,
        quantity: i64,
    ) -> Result<(), CheckoutError> {
        let reserved = self.products.reserve_stock(product_id, quantity).await?;
        if !reserved {
            return Err(CheckoutError::InsufficientStock {
                product_id: product_id.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Return previously reserved units (compensation path)
    ///
    /// 回滚属于尽力而为：失败只告警，不再向上冒泡，避免把一次
    /// 补偿失败放大成整个请求的二次失败。
    pub async fn release(&self, product_id: &RecordId, quantity: i64) {
        if let Err(e) = self.products.release_stock(product_id, quantity).await {
            tracing::error!(
                product = %product_id,
                quantity,
                error = %e,
                "Failed to release reserved stock"
            );
        }
    }
}
