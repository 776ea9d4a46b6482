//! 资源属主访问控制
//!
//! 地址、购物车条目、订单等用户私有资源的统一访问规则：
//! 属主本人或管理员可访问，其余一律 403。
//!
//! 403 (Forbidden) 与 404 (NotFound) 严格区分：资源存在但无权访问时
//! 返回 403，不得用 404 掩盖。

use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// 访问检查: 管理员或属主
pub fn can_access(user: &CurrentUser, owner_id: &RecordId) -> bool {
    user.is_admin() || user.id == owner_id.to_string()
}

/// 访问检查，失败返回 [`AppError::Forbidden`]
///
/// # 示例
///
/// ```ignore
/// let order = repo.find_by_id(&id).await?
///     .ok_or_else(|| AppError::not_found("Order not found"))?;
/// ensure_owner(&user, &order.user)?;
/// ```
pub fn ensure_owner(user: &CurrentUser, owner_id: &RecordId) -> Result<(), AppError> {
    if can_access(user, owner_id) {
        return Ok(());
    }
    Err(AppError::forbidden("Access denied".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Role;
    use surrealdb::RecordId;

    fn user(id: &str, role: Role) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_owner_can_access() {
        let owner = RecordId::from_table_key("user", "alice");
        let u = user("user:alice", Role::Customer);
        assert!(can_access(&u, &owner));
        assert!(ensure_owner(&u, &owner).is_ok());
    }

    #[test]
    fn test_admin_can_access_any() {
        let owner = RecordId::from_table_key("user", "alice");
        let admin = user("user:root", Role::Admin);
        assert!(can_access(&admin, &owner));
    }

    #[test]
    fn test_stranger_denied() {
        let owner = RecordId::from_table_key("user", "alice");
        let stranger = user("user:mallory", Role::Customer);
        assert!(!can_access(&stranger, &owner));

        let err = ensure_owner(&stranger, &owner).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
