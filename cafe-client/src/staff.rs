//! Staff session with transparent token refresh
//!
//! # Refresh flow
//!
//! ```text
//! send_authorized(request)
//!     ├─ send with stored access token
//!     ├─ auth failure? ──▶ refresh (coalesced, at most once) ──▶ resend once
//!     └─ refresh rejected ──▶ clear store, SessionExpired
//! ```
//!
//! Concurrent requests that fail with the same expired token share a single
//! refresh call: the first one takes the refresh lock and the rest find a
//! newer token in the store when they get it.

use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::client::{HistoryQuery, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse};
use shared::models::StaffInfo;
use shared::order::{OrderEvent, OrderView};
use tokio::sync::Mutex;

use crate::session_store::{SessionStore, StoredSession};
use crate::transport::{HttpTransport, decode, with_query};
use crate::{ClientError, ClientResult};

pub struct StaffSession {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for StaffSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffSession").finish_non_exhaustive()
    }
}

fn event_path(event: OrderEvent) -> &'static str {
    match event {
        OrderEvent::StartPreparing => "start-preparing",
        OrderEvent::MarkComplete => "complete",
        OrderEvent::MarkPaid => "pay",
        OrderEvent::Cancel => "cancel",
    }
}

impl StaffSession {
    pub fn new(transport: Arc<dyn HttpTransport>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            transport,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Whether a token pair is stored
    pub fn is_logged_in(&self) -> ClientResult<bool> {
        Ok(self.store.load()?.is_some())
    }

    /// Staff the stored session belongs to
    pub fn current_staff(&self) -> ClientResult<Option<StaffInfo>> {
        Ok(self.store.load()?.map(|s| s.staff))
    }

    // ========== Session ==========

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<StaffInfo> {
        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let data = self
            .transport
            .execute(Method::POST, "/api/auth/login", None, Some(body))
            .await?;
        let response: LoginResponse = decode(data)?;

        self.store.save(&StoredSession {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            staff: response.staff.clone(),
        })?;
        tracing::info!(staff_id = response.staff.id, "Logged in");
        Ok(response.staff)
    }

    /// Revoke the session on the server and forget it locally
    ///
    /// The local session is cleared even if the server cannot be reached.
    pub async fn logout(&self) -> ClientResult<()> {
        let Some(session) = self.store.load()? else {
            return Ok(());
        };
        self.store.clear()?;

        let body = serde_json::to_value(LogoutRequest {
            refresh_token: session.refresh_token,
        })?;
        self.transport
            .execute(Method::POST, "/api/auth/logout", None, Some(body))
            .await?;
        Ok(())
    }

    pub async fn me(&self) -> ClientResult<StaffInfo> {
        self.get("/api/auth/me").await
    }

    // ========== Orders ==========

    pub async fn get_order(&self, id: i64) -> ClientResult<OrderView> {
        self.get(&format!("/api/orders/{}", id)).await
    }

    pub async fn todays_orders(&self) -> ClientResult<Vec<OrderView>> {
        self.get("/api/orders/today").await
    }

    pub async fn pending_queue(&self) -> ClientResult<Vec<OrderView>> {
        self.get("/api/orders/pending").await
    }

    pub async fn unpaid(&self) -> ClientResult<Vec<OrderView>> {
        self.get("/api/orders/unpaid").await
    }

    pub async fn history(&self, query: &HistoryQuery) -> ClientResult<Vec<OrderView>> {
        let mut params = Vec::new();
        if let Some(from) = query.from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = query.to {
            params.push(("to", to.to_string()));
        }
        self.get(&with_query("/api/orders/history", &params)?).await
    }

    /// Apply a lifecycle event; a [`ClientError::is_stale_state`] error means
    /// the order must be refetched
    pub async fn transition(&self, id: i64, event: OrderEvent) -> ClientResult<OrderView> {
        let path = format!("/api/orders/{}/{}", id, event_path(event));
        let data = self.send_authorized(Method::POST, &path, None).await?;
        decode(data)
    }

    pub async fn start_preparing(&self, id: i64) -> ClientResult<OrderView> {
        self.transition(id, OrderEvent::StartPreparing).await
    }

    pub async fn complete(&self, id: i64) -> ClientResult<OrderView> {
        self.transition(id, OrderEvent::MarkComplete).await
    }

    pub async fn pay(&self, id: i64) -> ClientResult<OrderView> {
        self.transition(id, OrderEvent::MarkPaid).await
    }

    pub async fn cancel(&self, id: i64) -> ClientResult<OrderView> {
        self.transition(id, OrderEvent::Cancel).await
    }

    // ========== Authorized requests ==========

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let data = self.send_authorized(Method::GET, path, None).await?;
        decode(data)
    }

    /// Send with the stored access token, refreshing once on auth failure
    pub async fn send_authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<Value> {
        let session = self.store.load()?.ok_or(ClientError::NotLoggedIn)?;

        match self
            .transport
            .execute(method.clone(), path, Some(session.access_token.as_str()), body.clone())
            .await
        {
            Err(e) if e.is_auth_failure() => {
                tracing::debug!(path, error = %e, "Request unauthorized, refreshing");
                let token = self.refresh_after(&session.access_token).await?;
                // 只重试一次，失败直接返回
                self.transport
                    .execute(method, path, Some(token.as_str()), body)
                    .await
            }
            other => other,
        }
    }

    /// Obtain an access token newer than `stale`
    ///
    /// Holding the refresh lock serialises refreshes; a caller that waited on
    /// the lock reuses the token the previous holder stored.
    async fn refresh_after(&self, stale: &str) -> ClientResult<String> {
        let _guard = self.refresh_lock.lock().await;

        let mut session = self.store.load()?.ok_or(ClientError::SessionExpired)?;
        if session.access_token != stale {
            return Ok(session.access_token);
        }

        let body = serde_json::to_value(RefreshRequest {
            refresh_token: session.refresh_token.clone(),
        })?;
        let refreshed = match self
            .transport
            .execute(Method::POST, "/api/auth/refresh", None, Some(body))
            .await
        {
            Ok(data) => decode::<RefreshResponse>(data)?,
            Err(e @ ClientError::Api { .. }) => {
                tracing::warn!(error = %e, "Refresh rejected, discarding session");
                self.store.clear()?;
                return Err(ClientError::SessionExpired);
            }
            Err(e) => return Err(e),
        };

        session.access_token = refreshed.access_token;
        self.store.save(&session)?;
        Ok(session.access_token)
    }
}
