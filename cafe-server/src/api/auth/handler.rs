//! Authentication Handlers

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse};
use shared::models::StaffInfo;

use crate::api::{ApiResponse, AppResult};
use crate::auth::{ClientIp, CurrentStaff};
use crate::core::ServerState;

/// Login handler
///
/// Returns an access/refresh token pair. Failed attempts count against the
/// caller's address.
pub async fn login(
    State(state): State<ServerState>,
    ClientIp(ip): ClientIp,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let response = state.sessions.login(&ip, &req).await?;
    Ok(ApiResponse::success(response))
}

/// Exchange a refresh token for a new access token
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<ApiResponse<RefreshResponse>> {
    let response = state.sessions.refresh(&req.refresh_token)?;
    Ok(ApiResponse::success(response))
}

/// Revoke the session owning the refresh token (idempotent)
pub async fn logout(
    State(state): State<ServerState>,
    Json(req): Json<LogoutRequest>,
) -> AppResult<ApiResponse<()>> {
    state.sessions.logout(&req.refresh_token)?;
    Ok(ApiResponse::ok())
}

/// Get current staff info
pub async fn me(staff: CurrentStaff) -> AppResult<ApiResponse<StaffInfo>> {
    Ok(ApiResponse::success(staff.to_info()))
}
