//! Product Repository
//!
//! 含库存台账的原子条件扣减：检查与扣减在单条语句内完成，
//! 并发下同一商品不会被超卖 (见 checkout::ledger)。

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const PRODUCT_TABLE: &str = "product";
const CATEGORY_TABLE: &str = "category";

/// 库存更新的乐观事务冲突重试上限
const MAX_CONFLICT_RETRIES: u32 = 3;

/// 乐观事务冲突 (另一路写同一记录正在提交)
fn is_conflict(err: &surrealdb::Error) -> bool {
    err.to_string().contains("conflict")
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find products, optionally filtered by category and/or a
    /// case-insensitive substring match on name/description
    pub async fn find_all(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> RepoResult<Vec<Product>> {
        let mut clauses: Vec<&str> = Vec::new();
        if category.is_some() {
            clauses.push("category = $category");
        }
        if search.is_some() {
            clauses.push(
                "(string::lowercase(name) CONTAINS $search OR string::lowercase(description ?? '') CONTAINS $search)",
            );
        }

        let query_str = if clauses.is_empty() {
            "SELECT * FROM product ORDER BY name".to_string()
        } else {
            format!(
                "SELECT * FROM product WHERE {} ORDER BY name",
                clauses.join(" AND ")
            )
        };

        let mut query = self.base.db().query(query_str);
        if let Some(cat) = category {
            let cat_thing = record_id(CATEGORY_TABLE, cat)?;
            query = query.bind(("category", cat_thing));
        }
        if let Some(s) = search {
            query = query.bind(("search", s.to_lowercase()));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let thing = record_id(PRODUCT_TABLE, id)?;
        let product: Option<Product> = self.base.db().select(thing).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let category = record_id(CATEGORY_TABLE, &data.category_id)?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    category = $category,
                    name = $name,
                    description = $description,
                    price = $price,
                    stock_quantity = $stock_quantity,
                    image_url = $image_url
                RETURN AFTER"#,
            )
            .bind(("category", category))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("price", data.price))
            .bind(("stock_quantity", data.stock_quantity))
            .bind(("image_url", data.image_url))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing = record_id(PRODUCT_TABLE, id)?;

        let mut set_parts: Vec<&str> = Vec::new();
        if data.category_id.is_some() {
            set_parts.push("category = $category");
        }
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.stock_quantity.is_some() {
            set_parts.push("stock_quantity = $stock_quantity");
        }
        if data.image_url.is_some() {
            set_parts.push("image_url = $image_url");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("thing", thing));

        if let Some(v) = data.category_id {
            let cat_thing = record_id(CATEGORY_TABLE, &v)?;
            query = query.bind(("category", cat_thing));
        }
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.stock_quantity {
            query = query.bind(("stock_quantity", v));
        }
        if let Some(v) = data.image_url {
            query = query.bind(("image_url", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = record_id(PRODUCT_TABLE, id)?;
        let deleted: Option<Product> = self.base.db().delete(thing).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Atomically reserve `quantity` units of stock
    ///
    /// 检查与扣减在同一条 UPDATE 内完成：条件不满足时语句不修改任何行，
    /// 返回 `false`；满足时扣减并返回 `true`。两路并发预留同一商品时
    /// 最多一路成功把库存打到阈值以下。
    ///
    /// 嵌入式引擎的乐观事务在并发写同一记录时可能以冲突失败；
    /// 冲突只说明另一路预留正在提交，条件更新重读后重做即可，
    /// 不改变"检查+扣减原子"这一不变量。
    pub async fn reserve_stock(&self, product: &RecordId, quantity: i64) -> RepoResult<bool> {
        let mut attempts = 0;
        loop {
            let result = self
                .base
                .db()
                .query(
                    "UPDATE $product SET stock_quantity -= $qty WHERE stock_quantity >= $qty RETURN AFTER",
                )
                .bind(("product", product.clone()))
                .bind(("qty", quantity))
                .await
                .and_then(|mut r| r.take::<Vec<Product>>(0));

            match result {
                Ok(updated) => return Ok(!updated.is_empty()),
                Err(e) if is_conflict(&e) && attempts < MAX_CONFLICT_RETRIES => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Return previously reserved stock (compensation path)
    pub async fn release_stock(&self, product: &RecordId, quantity: i64) -> RepoResult<()> {
        let mut attempts = 0;
        loop {
            let result = self
                .base
                .db()
                .query("UPDATE $product SET stock_quantity += $qty RETURN AFTER")
                .bind(("product", product.clone()))
                .bind(("qty", quantity))
                .await
                .and_then(|mut r| r.take::<Vec<Product>>(0));

            match result {
                Ok(updated) => {
                    if updated.is_empty() {
                        // 商品在预留后被删除，放回无目标；记录告警但不再失败
                        tracing::warn!(product = %product, quantity, "release_stock target missing");
                    }
                    return Ok(());
                }
                Err(e) if is_conflict(&e) && attempts < MAX_CONFLICT_RETRIES => {
                    attempts += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
