//! 认证授权模块
//!
//! - [`JwtService`] - 访问令牌服务
//! - [`CurrentStaff`] - 当前员工上下文
//! - [`require_auth`] - 认证中间件
//! - [`can_perform`] - 订单事件权限判定
//! - [`LoginRateLimiter`] - 登录失败限流

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;
pub mod rate_limit;

pub use extractor::CurrentStaff;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use permissions::{can_perform, required_role};
pub use rate_limit::{ClientIp, LoginRateLimiter};
