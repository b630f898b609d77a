//! 服务层
//!
//! - **https**: 路由装配与中间件

pub mod https;
