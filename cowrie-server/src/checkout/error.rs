//! Checkout Error Types

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// 下单流程错误
///
/// 所有变体都是当次请求的终态：核心不做重试，由边界层翻译为
/// HTTP 响应。库存不足与空购物车不得被降级吞掉。
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock for {name}")]
    InsufficientStock { product_id: String, name: String },

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error(transparent)]
    Store(#[from] RepoError),
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart => AppError::business_rule("Cart is empty"),
            CheckoutError::InsufficientStock { name, .. } => {
                AppError::business_rule(format!("Insufficient stock for {}", name))
            }
            CheckoutError::AddressNotFound(id) => {
                AppError::validation(format!("Address not found: {}", id))
            }
            CheckoutError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_mapping() {
        assert!(matches!(
            AppError::from(CheckoutError::EmptyCart),
            AppError::BusinessRule(_)
        ));
        assert!(matches!(
            AppError::from(CheckoutError::InsufficientStock {
                product_id: "product:x".to_string(),
                name: "Widget".to_string(),
            }),
            AppError::BusinessRule(_)
        ));
        assert!(matches!(
            AppError::from(CheckoutError::AddressNotFound("address:a".to_string())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(CheckoutError::Store(RepoError::Database("boom".into()))),
            AppError::Database(_)
        ));
    }
}
