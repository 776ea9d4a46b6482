//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

// Auth
pub mod user;

// Customer Domain
pub mod address;
pub mod cart;

// Catalog Domain
pub mod category;
pub mod product;

// Orders
pub mod order;

// Re-exports
pub use address::AddressRepository;
pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// API 路径参数允许两种写法：完整 "table:id" 或纯 key。
// [`record_id`] 负责归一化；表名不匹配按 Validation 错误处理。

/// Parse an id string into a [`RecordId`] for `table`
pub fn record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    match id.split_once(':') {
        Some((t, key)) => {
            if t != table {
                return Err(RepoError::Validation(format!(
                    "Invalid {} ID: {}",
                    table, id
                )));
            }
            if key.is_empty() {
                return Err(RepoError::Validation(format!(
                    "Invalid {} ID: {}",
                    table, id
                )));
            }
            Ok(RecordId::from_table_key(t, key))
        }
        None => {
            if id.is_empty() {
                return Err(RepoError::Validation(format!("Invalid {} ID", table)));
            }
            Ok(RecordId::from_table_key(table, id))
        }
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_accepts_both_forms() {
        let full = record_id("product", "product:abc").unwrap();
        let bare = record_id("product", "abc").unwrap();
        assert_eq!(full, bare);
        assert_eq!(full.to_string(), "product:abc");
    }

    #[test]
    fn test_record_id_rejects_wrong_table() {
        assert!(record_id("product", "category:abc").is_err());
        assert!(record_id("product", "").is_err());
        assert!(record_id("product", "product:").is_err());
    }
}
