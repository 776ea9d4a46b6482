//! 下单核心流程
//!
//! 把购物车转换为持久化订单的唯一通道：
//!
//! - [`snapshot`] - 购物车快照读取 (行项目携带读取时刻的商品单价与库存)
//! - [`ledger`] - 库存台账 (原子条件扣减 / 补偿回滚)
//! - [`service`] - 订单装配 (校验、计总、落单、清空购物车，整体 all-or-nothing)
//! - [`money`] - Decimal 金额计算
//!
//! 这是全系统唯一跨多实体的一致性区域；库存预留与多步写入的
//! 回滚策略见各子模块。

pub mod error;
pub mod ledger;
pub mod money;
pub mod service;
pub mod snapshot;

pub use error::CheckoutError;
pub use ledger::InventoryLedger;
pub use service::CheckoutService;
pub use snapshot::{CartSnapshot, SnapshotReader};
