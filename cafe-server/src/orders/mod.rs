//! 订单生命周期
//!
//! ```text
//! place_order ──▶ pending ──▶ preparing ──▶ completed ──▶ paid
//!                    │            │
//!                    └────────────┴──▶ cancelled
//! ```
//!
//! - **manager**: [`OrdersManager`] - 下单、状态迁移、读取分区
//!
//! 状态迁移表定义在 `shared::order`，权限判定在 [`crate::auth::permissions`]。
//! 并发迁移的正确性由存储层的状态比较写入保证，不使用进程内锁。

pub mod manager;

pub use manager::{ManagerError, ManagerResult, OrderPolicy, OrdersManager};
