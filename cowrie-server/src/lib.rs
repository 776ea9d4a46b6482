//! Cowrie Server - 电商后端服务
//!
//! # 架构概述
//!
//! 本模块是 Cowrie Server 的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **下单流程** (`checkout`): 购物车快照、库存预留、订单装配
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! cowrie-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── auth/          # JWT 认证、访问控制
//! ├── api/           # HTTP 路由和处理器
//! ├── checkout/      # 下单核心流程
//! ├── utils/         # 工具函数
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod checkout;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use crate::auth::{CurrentUser, JwtService};
pub use crate::checkout::{CheckoutError, CheckoutService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ______                      _
  / ____/___ _      _______  (_)__
 / /   / __ \ | /| / / ___/ / / _ \
/ /___/ /_/ / |/ |/ / /    / /  __/
\____/\____/|__/|__/_/    /_/\___/
    "#
    );
}
