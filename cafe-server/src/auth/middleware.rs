//! 认证中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, Uri};
use shared::AppError;

use crate::auth::JwtService;
use crate::core::ServerState;
use crate::security_log;
use crate::session::SessionError;

/// 认证中间件 - 要求员工登录
///
/// 从 `Authorization: Bearer <token>` 头提取访问令牌，经会话管理器验证后
/// 将 [`CurrentStaff`](super::CurrentStaff) 注入请求扩展。只挂在受保护路由上
/// (`route_layer`)，公共路由不经过这里。
///
/// # 错误处理
///
/// | 错误 | 错误码 |
/// |------|--------|
/// | 无 Authorization 头 | TokenMissing |
/// | 头格式错误 / 签名无效 / 会话已吊销 | TokenInvalid |
/// | 令牌过期 | TokenExpired |
/// | 员工不存在 | StaffNotFound |
/// | 员工已停用 | AccountInactive |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers(), req.uri())?;
    match state.sessions.authenticate(token) {
        Ok(staff) => {
            req.extensions_mut().insert(staff);
            Ok(next.run(req).await)
        }
        Err(e) => {
            log_auth_failure(&e, req.uri());
            Err(e.into())
        }
    }
}

pub(crate) fn bearer_token<'a>(headers: &'a HeaderMap, uri: &Uri) -> Result<&'a str, AppError> {
    match headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
        None => {
            security_log!("WARN", "auth_missing", uri = uri.to_string());
            Err(AppError::token_missing())
        }
    }
}

pub(crate) fn log_auth_failure(err: &SessionError, uri: &Uri) {
    // Expiry is routine; clients refresh and retry
    if matches!(err, SessionError::TokenExpired) {
        tracing::debug!(uri = %uri, "Access token expired");
        return;
    }
    security_log!(
        "WARN",
        "auth_failed",
        error = err.to_string(),
        uri = uri.to_string()
    );
}
