//! Database Module
//!
//! 嵌入式 SurrealDB 连接和 schema 定义

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::core::ServerError;

const NAMESPACE: &str = "cowrie";
const DATABASE: &str = "main";

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the embedded database at `db_path` and apply schema definitions
    pub async fn new(db_path: &str) -> Result<Self, ServerError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| ServerError::Database(format!("Failed to open database: {}", e)))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| ServerError::Database(format!("Failed to select namespace: {}", e)))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established (SurrealDB RocksDB at {})", db_path);

        Ok(Self { db })
    }
}

/// Schema 定义
///
/// 表保持 schemaless，仅声明一致性所需的唯一索引：
/// - `user.email` - 邮箱唯一
/// - `cart.user` - 每用户一个购物车 (get-or-create 幂等)
/// - `cart_item.(cart, product)` - 每 (cart, product) 至多一行，重复添加走数量累加
/// - `category.name` - 分类名唯一
pub async fn define_schema(db: &Surreal<Db>) -> Result<(), ServerError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS cart_owner ON TABLE cart COLUMNS user UNIQUE;
        DEFINE INDEX IF NOT EXISTS cart_item_line ON TABLE cart_item COLUMNS cart, product UNIQUE;
        DEFINE INDEX IF NOT EXISTS category_name ON TABLE category COLUMNS name UNIQUE;
        "#,
    )
    .await
    .and_then(|response| response.check())
    .map_err(|e| ServerError::Database(format!("Failed to define schema: {}", e)))?;

    Ok(())
}
