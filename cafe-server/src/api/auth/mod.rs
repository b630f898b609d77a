//! Authentication Routes
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/auth/login | POST | 无 (按来源地址限流) |
//! | /api/auth/refresh | POST | 无 (刷新令牌) |
//! | /api/auth/logout | POST | 无 (刷新令牌) |
//! | /api/auth/me | GET | 员工 |

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Public session endpoints
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/refresh", post(handler::refresh))
        .route("/api/auth/logout", post(handler::logout))
}

/// Endpoints behind `require_auth`
pub fn staff_router() -> Router<ServerState> {
    Router::new().route("/api/auth/me", get(handler::me))
}
