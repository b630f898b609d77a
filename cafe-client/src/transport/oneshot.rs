// Oneshot 传输 - 内存通信
//
// 需要启用 "in-process" feature

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use axum::Router;
use axum::extract::ConnectInfo;
use axum::body::Body;
use http::{Method, Request};
use serde_json::Value;
use tower::ServiceExt;

use super::{HttpTransport, parse_envelope};
use crate::{ClientError, ClientResult};

/// Oneshot HTTP 传输 (内存调用)
///
/// 使用 Tower Service 的 oneshot 模式直接调用 Router，
/// 适用于同进程的服务器-客户端通信，零网络开销。
///
/// ```ignore
/// let router = cafe_server::build_router(state);
/// let transport = OneshotTransport::new(router);
/// ```
#[derive(Debug, Clone)]
pub struct OneshotTransport {
    router: Router,
    peer: Option<SocketAddr>,
}

impl OneshotTransport {
    /// `router` 必须已调用 `with_state`
    pub fn new(router: Router) -> Self {
        Self {
            router,
            peer: None,
        }
    }

    /// 以指定对端地址发送请求，等同于 TCP 连接的 `ConnectInfo`
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.peer = Some(SocketAddr::new(ip, 0));
        self
    }
}

#[async_trait]
impl HttpTransport for OneshotTransport {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> ClientResult<Value> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = bearer {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(peer) = self.peer {
            builder = builder.extension(ConnectInfo(peer));
        }

        let body = match body {
            Some(value) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value)?)
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .map_err(|e| ClientError::Internal(format!("Failed to build request: {}", e)))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Internal(format!("Oneshot call failed: {}", e)))?;

        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Internal(format!("Failed to read body: {}", e)))?;
        parse_envelope(status, &bytes)
    }
}
