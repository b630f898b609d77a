//! Current staff extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::{StaffInfo, StaffRole};

use crate::core::ServerState;
use shared::AppError;

/// 当前员工上下文
///
/// 由 [`require_auth`](super::require_auth) 从员工记录解析后注入请求扩展；
/// `role` 来自数据库而非令牌。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentStaff {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: StaffRole,
    /// 签发令牌的会话
    pub session_id: String,
}

impl CurrentStaff {
    pub fn to_info(&self) -> StaffInfo {
        StaffInfo {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            is_active: true,
        }
    }
}

impl FromRequestParts<ServerState> for CurrentStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the middleware
        if let Some(staff) = parts.extensions.get::<CurrentStaff>() {
            return Ok(staff.clone());
        }

        let token = super::middleware::bearer_token(&parts.headers, &parts.uri)?;
        let staff = state.sessions.authenticate(token).map_err(|e| {
            super::middleware::log_auth_failure(&e, &parts.uri);
            AppError::from(e)
        })?;
        parts.extensions.insert(staff.clone());
        Ok(staff)
    }
}
