//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`venue`] - 店铺与地理围栏配置 (公共)
//! - [`tables`] - 桌台验证 (公共)
//! - [`auth`] - 员工登录、刷新、登出
//! - [`orders`] - 下单 (公共) 与订单生命周期 (员工)
//!
//! 所有响应都使用 `ApiResponse` 包装。

pub mod auth;
pub mod health;
pub mod orders;
pub mod tables;
pub mod venue;

// Re-export common types for handlers
pub use shared::{ApiResponse, AppResult};
