//! Login rate limiting
//!
//! Each login attempt reserves a slot in a per-address fixed window before any
//! work is done. Failed attempts keep their slot; successful ones give it back.

use axum::extract::{ConnectInfo, FromRequestParts};
use http::request::Parts;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::core::ServerState;

struct IpEntry {
    /// 失败次数 + 进行中的尝试
    attempts: u32,
    window_start: Instant,
}

#[derive(Clone)]
pub struct LoginRateLimiter {
    inner: Arc<Mutex<HashMap<String, IpEntry>>>,
    max_failures: u32,
    window: Duration,
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("max_failures", &self.max_failures)
            .field("window", &self.window)
            .field("tracked", &self.inner.lock().len())
            .finish()
    }
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window,
        }
    }

    /// Reserve one attempt for `ip`
    ///
    /// Returns the attempt count in the current window, or `None` when the
    /// budget is used up. Check and increment happen under one lock, so
    /// concurrent attempts cannot overshoot the budget.
    pub fn try_begin(&self, ip: &str) -> Option<u32> {
        let mut map = self.inner.lock();
        let now = Instant::now();
        let entry = map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            attempts: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.attempts = 0;
            entry.window_start = now;
        }
        if entry.attempts >= self.max_failures {
            return None;
        }

        entry.attempts += 1;
        Some(entry.attempts)
    }

    /// Give back a slot reserved by [`try_begin`](Self::try_begin)
    pub fn release(&self, ip: &str) {
        if let Some(entry) = self.inner.lock().get_mut(ip) {
            entry.attempts = entry.attempts.saturating_sub(1);
        }
    }

    /// Drop entries whose window has expired
    pub fn cleanup(&self) -> usize {
        let mut map = self.inner.lock();
        let before = map.len();
        let window = self.window;
        map.retain(|_, entry| entry.window_start.elapsed() < window);
        before - map.len()
    }
}

/// Client address used as the rate-limit key
///
/// 默认取 TCP 对端地址。只有对端在 `TRUSTED_PROXIES` 中时才读取
/// `X-Forwarded-For`，并取最右侧的非代理地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn resolve(parts: &Parts, trusted_proxies: &[IpAddr]) -> Self {
        let Some(peer) = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip())
        else {
            return Self("unknown".to_owned());
        };
        if !trusted_proxies.contains(&peer) {
            return Self(peer.to_string());
        }

        let hops: Vec<&str> = parts
            .headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .collect();
        for hop in hops.into_iter().rev() {
            match hop.trim().parse::<IpAddr>() {
                Ok(ip) if trusted_proxies.contains(&ip) => continue,
                Ok(ip) => return Self(ip.to_string()),
                Err(_) => break,
            }
        }
        Self(peer.to_string())
    }
}

impl FromRequestParts<ServerState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(parts, &state.config.trusted_proxies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_from(peer: Option<&str>, forwarded: Option<&str>) -> Parts {
        let mut builder = http::Request::builder();
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(peer) = peer {
            let addr = SocketAddr::new(peer.parse().unwrap(), 40000);
            parts.extensions.insert(ConnectInfo(addr));
        }
        parts
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_after_budget() {
        let limiter = LoginRateLimiter::new(3, Duration::from_secs(900));
        assert_eq!(limiter.try_begin("10.0.0.1"), Some(1));
        assert_eq!(limiter.try_begin("10.0.0.1"), Some(2));
        assert_eq!(limiter.try_begin("10.0.0.1"), Some(3));
        assert_eq!(limiter.try_begin("10.0.0.1"), None);
        // other addresses unaffected
        assert_eq!(limiter.try_begin("10.0.0.2"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_returns_slot() {
        let limiter = LoginRateLimiter::new(1, Duration::from_secs(900));
        assert_eq!(limiter.try_begin("ip"), Some(1));
        assert_eq!(limiter.try_begin("ip"), None);
        limiter.release("ip");
        assert_eq!(limiter.try_begin("ip"), Some(1));

        // releasing an unknown or empty entry is harmless
        limiter.release("other");
        limiter.release("ip");
        limiter.release("ip");
        assert_eq!(limiter.try_begin("ip"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_unblocks() {
        let limiter = LoginRateLimiter::new(1, Duration::from_secs(900));
        limiter.try_begin("ip");
        assert_eq!(limiter.try_begin("ip"), None);

        tokio::time::advance(Duration::from_secs(901)).await;
        assert_eq!(limiter.cleanup(), 1);
        assert_eq!(limiter.try_begin("ip"), Some(1));
    }

    #[test]
    fn test_spoofed_forwarded_header_is_ignored() {
        let parts = parts_from(Some("198.51.100.20"), Some("203.0.113.9"));
        assert_eq!(ClientIp::resolve(&parts, &[]).0, "198.51.100.20");

        let proxy: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(ClientIp::resolve(&parts, &[proxy]).0, "198.51.100.20");
    }

    #[test]
    fn test_trusted_proxy_forwards_client_address() {
        let proxies: Vec<IpAddr> = vec!["10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap()];

        // the left-most hop is whatever the client sent; the right-most untrusted one wins
        let parts = parts_from(Some("10.0.0.1"), Some("1.1.1.1, 203.0.113.9, 10.0.0.2"));
        assert_eq!(ClientIp::resolve(&parts, &proxies).0, "203.0.113.9");

        let parts = parts_from(Some("10.0.0.1"), Some("garbage"));
        assert_eq!(ClientIp::resolve(&parts, &proxies).0, "10.0.0.1");

        let parts = parts_from(Some("10.0.0.1"), None);
        assert_eq!(ClientIp::resolve(&parts, &proxies).0, "10.0.0.1");
    }

    #[test]
    fn test_missing_peer_is_unknown() {
        let parts = parts_from(None, Some("203.0.113.9"));
        assert_eq!(ClientIp::resolve(&parts, &[]).0, "unknown");
    }
}
