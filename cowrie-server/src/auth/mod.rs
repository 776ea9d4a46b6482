//! 认证授权模块
//!
//! 提供 JWT 认证和访问控制：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件
//! - [`require_admin`] - 管理员检查中间件
//! - [`guard`] - 资源属主访问控制

pub mod extractor;
pub mod guard;
pub mod jwt;
pub mod middleware;

pub use guard::{can_access, ensure_owner};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
