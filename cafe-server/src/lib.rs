//! Cafe Server - 扫码点餐的准入与订单生命周期服务
//!
//! # 架构概述
//!
//! - **会话** (`session`): 员工登录、访问令牌校验、静默刷新、登出
//! - **认证** (`auth`): JWT、认证中间件、登录限流、订单事件权限
//! - **订单** (`orders`): 下单、状态机迁移 (乐观并发)、读取分区
//! - **数据库** (`db`): 嵌入式 redb 存储
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! cafe-server/src/
//! ├── core/          # 配置、状态、错误、后台任务、种子数据
//! ├── auth/          # JWT 认证、权限、限流
//! ├── session/       # 会话管理
//! ├── orders/        # 订单生命周期
//! ├── services/      # 路由装配
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、时间、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod session;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentStaff, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrdersManager;
pub use services::https::build_router;
pub use session::SessionManager;

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
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
