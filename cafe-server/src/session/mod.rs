//! 员工会话管理
//!
//! 登录签发 (访问令牌, 刷新令牌) 对：
//! - 访问令牌：短期 JWT，携带 staff id 与 session id
//! - 刷新令牌：32 字节随机值，服务端只保存其 SHA-256
//!
//! 每次认证都会重新读取员工记录，角色变更或停用立即生效。

mod error;
mod token;

#[cfg(test)]
mod tests;

pub use error::{SessionError, SessionResult};
pub use token::{generate_refresh_token, hash_refresh_token};

use std::sync::Arc;
use std::time::Duration;

use shared::client::{LoginRequest, LoginResponse, RefreshResponse};
use shared::util::now_millis;

use crate::auth::jwt::ACCESS_TOKEN_TYPE;
use crate::auth::{CurrentStaff, JwtError, JwtService, LoginRateLimiter};
use crate::db::{SessionRecord, StaffAccount, Storage};
use crate::security_log;
use crate::utils::validation::MAX_PASSWORD_LEN;

/// 会话策略
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// 刷新令牌有效期
    pub refresh_ttl: chrono::Duration,
    /// 登录应答前的固定延迟 (防止计时攻击)
    pub login_fixed_delay: Duration,
    /// 是否要求邮箱已验证
    pub require_verified_email: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            refresh_ttl: chrono::Duration::days(7),
            login_fixed_delay: Duration::from_millis(500),
            require_verified_email: false,
        }
    }
}

/// Session Manager
#[derive(Debug, Clone)]
pub struct SessionManager {
    storage: Storage,
    jwt: Arc<JwtService>,
    limiter: LoginRateLimiter,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(
        storage: Storage,
        jwt: Arc<JwtService>,
        limiter: LoginRateLimiter,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            storage,
            jwt,
            limiter,
            policy,
        }
    }

    pub fn limiter(&self) -> &LoginRateLimiter {
        &self.limiter
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// 登录
    ///
    /// 每次尝试在固定延迟之前预占一个限流名额，失败的尝试保留名额，
    /// 成功或内部错误时归还。用户不存在与密码错误返回同一错误；
    /// 密码验证通过后才会披露账户状态。
    pub async fn login(&self, ip: &str, req: &LoginRequest) -> SessionResult<LoginResponse> {
        let Some(attempt) = self.limiter.try_begin(ip) else {
            security_log!(
                "WARN",
                "login_rate_limited",
                ip = ip.to_string(),
                username = req.username.clone()
            );
            return Err(SessionError::TooManyAttempts);
        };

        tokio::time::sleep(self.policy.login_fixed_delay).await;

        let account = match self.check_credentials(req).await {
            Ok(account) => account,
            Err(
                e @ (SessionError::InvalidCredentials
                | SessionError::AccountInactive
                | SessionError::EmailUnverified),
            ) => {
                security_log!(
                    "WARN",
                    "login_failed",
                    ip = ip.to_string(),
                    username = req.username.clone(),
                    reason = e.to_string(),
                    failures = attempt
                );
                return Err(e);
            }
            Err(e) => {
                self.limiter.release(ip);
                return Err(e);
            }
        };
        self.limiter.release(ip);

        let response = self.open_session(&account)?;
        tracing::info!(
            staff_id = account.id,
            username = %account.username,
            role = %account.role,
            "Staff logged in"
        );
        Ok(response)
    }

    async fn check_credentials(&self, req: &LoginRequest) -> SessionResult<StaffAccount> {
        if req.password.len() > MAX_PASSWORD_LEN {
            return Err(SessionError::InvalidCredentials);
        }

        let account = self
            .storage
            .find_staff_by_username(&req.username)?
            .ok_or(SessionError::InvalidCredentials)?;

        // argon2 是 CPU 密集操作，不占用异步工作线程
        let password = req.password.clone();
        let (account, valid) = tokio::task::spawn_blocking(move || {
            let valid = account.verify_password(&password);
            (account, valid)
        })
        .await
        .map_err(|e| SessionError::Credential(e.to_string()))?;
        let valid = valid.map_err(|e| SessionError::Credential(e.to_string()))?;
        if !valid {
            return Err(SessionError::InvalidCredentials);
        }

        if !account.is_active {
            return Err(SessionError::AccountInactive);
        }
        if self.policy.require_verified_email && !account.email_verified {
            return Err(SessionError::EmailUnverified);
        }
        Ok(account)
    }

    fn open_session(&self, account: &StaffAccount) -> SessionResult<LoginResponse> {
        let now = now_millis();
        let session_id = uuid::Uuid::new_v4().to_string();
        let refresh_token = generate_refresh_token()
            .map_err(|_| SessionError::Credential("random source unavailable".to_string()))?;
        let (access_token, access_expires_at) =
            self.jwt
                .generate_access_token(account.id, &account.username, &session_id)?;

        let record = SessionRecord {
            id: session_id,
            staff_id: account.id,
            refresh_hash: hash_refresh_token(&refresh_token),
            issued_at: now,
            refresh_expires_at: now + self.policy.refresh_ttl.num_milliseconds(),
            access_expires_at,
            revoked_at: None,
        };
        self.storage.insert_session(&record)?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_ttl_secs(),
            staff: account.to_info(),
        })
    }

    /// 验证访问令牌并重新解析员工身份
    pub fn authenticate(&self, token: &str) -> SessionResult<CurrentStaff> {
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::ExpiredToken => SessionError::TokenExpired,
            other => SessionError::TokenInvalid(other.to_string()),
        })?;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(SessionError::TokenInvalid(format!(
                "unexpected token type: {}",
                claims.token_type
            )));
        }
        let staff_id = claims
            .staff_id()
            .map_err(|e| SessionError::TokenInvalid(e.to_string()))?;

        let session = self
            .storage
            .get_session(&claims.sid)?
            .ok_or_else(|| SessionError::TokenInvalid("unknown session".to_string()))?;
        if session.is_revoked() || session.staff_id != staff_id {
            return Err(SessionError::TokenInvalid("session revoked".to_string()));
        }

        let account = self
            .storage
            .get_staff(staff_id)?
            .ok_or(SessionError::StaffNotFound)?;
        if !account.is_active {
            return Err(SessionError::AccountInactive);
        }

        Ok(CurrentStaff {
            id: account.id,
            username: account.username,
            display_name: account.display_name,
            role: account.role,
            session_id: session.id,
        })
    }

    /// 用刷新令牌换取新的访问令牌
    ///
    /// 刷新令牌本身不轮换。账户已停用或不存在时，吊销其全部会话。
    pub fn refresh(&self, refresh_token: &str) -> SessionResult<RefreshResponse> {
        let session = self
            .storage
            .find_session_by_refresh_hash(&hash_refresh_token(refresh_token))?
            .ok_or(SessionError::RefreshInvalid)?;
        if session.is_revoked() {
            return Err(SessionError::RefreshInvalid);
        }

        let now = now_millis();
        if session.is_expired(now) {
            return Err(SessionError::RefreshExpired);
        }

        let account = match self.storage.get_staff(session.staff_id)? {
            Some(account) if account.is_active => account,
            _ => {
                let revoked = self.storage.revoke_staff_sessions(session.staff_id, now)?;
                security_log!(
                    "WARN",
                    "refresh_rejected_inactive",
                    staff_id = session.staff_id,
                    revoked_sessions = revoked
                );
                return Err(SessionError::RefreshInvalid);
            }
        };

        let (access_token, access_expires_at) =
            self.jwt
                .generate_access_token(account.id, &account.username, &session.id)?;
        self.storage.touch_session(&session.id, access_expires_at)?;

        tracing::debug!(staff_id = account.id, session_id = %session.id, "Access token refreshed");
        Ok(RefreshResponse {
            access_token,
            expires_in: self.jwt.access_ttl_secs(),
        })
    }

    /// 登出：吊销刷新令牌所属的会话 (幂等)
    pub fn logout(&self, refresh_token: &str) -> SessionResult<()> {
        if let Some(session) = self
            .storage
            .find_session_by_refresh_hash(&hash_refresh_token(refresh_token))?
        {
            self.storage.revoke_session(&session.id, now_millis())?;
            tracing::info!(staff_id = session.staff_id, session_id = %session.id, "Staff logged out");
        }
        Ok(())
    }

    /// 删除刷新令牌已过期的会话
    pub fn purge_expired(&self) -> SessionResult<usize> {
        Ok(self.storage.purge_expired_sessions(now_millis())?)
    }
}
