//! Request transports
//!
//! Every server response is an `ApiResponse` envelope. A transport sends one
//! request and returns the envelope's `data` (or `null`), turning error
//! envelopes into [`ClientError::Api`].

mod network;
#[cfg(feature = "in-process")]
mod oneshot;

pub use network::NetworkTransport;
#[cfg(feature = "in-process")]
pub use oneshot::OneshotTransport;

use async_trait::async_trait;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::ApiResponse;

use crate::{ClientError, ClientResult};

/// HTTP 传输 trait
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request; `path` includes any query string
    async fn execute(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> ClientResult<Value>;
}

/// Decode the `data` of a successful envelope
pub(crate) fn decode<T: DeserializeOwned>(data: Value) -> ClientResult<T> {
    serde_json::from_value(data)
        .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// Unwrap an envelope body received with `status`
pub(crate) fn parse_envelope(status: u16, bytes: &[u8]) -> ClientResult<Value> {
    let envelope: ApiResponse<Value> = match serde_json::from_slice(bytes) {
        Ok(envelope) => envelope,
        // 非标准错误体 (如框架层的提取器拒绝)
        Err(e) if !(200..300).contains(&status) => {
            tracing::debug!(status, error = %e, "Error response is not an envelope");
            return Err(ClientError::Api {
                status,
                code: None,
                message: String::from_utf8_lossy(bytes).into_owned(),
                details: None,
            });
        }
        Err(e) => {
            return Err(ClientError::InvalidResponse(format!(
                "status {}: {}",
                status, e
            )));
        }
    };

    if (200..300).contains(&status) && envelope.is_success() {
        return Ok(envelope.data.unwrap_or(Value::Null));
    }

    Err(ClientError::Api {
        status,
        code: envelope.error_code(),
        message: envelope.message,
        details: envelope.details,
    })
}

/// Build `path?key=value&...`, percent-encoding the values
pub(crate) fn with_query(path: &str, params: &[(&str, String)]) -> ClientResult<String> {
    if params.is_empty() {
        return Ok(path.to_string());
    }
    let url = reqwest::Url::parse_with_params(&format!("http://localhost{}", path), params)
        .map_err(|e| ClientError::Internal(format!("invalid path {}: {}", path, e)))?;
    match url.query() {
        Some(query) => Ok(format!("{}?{}", url.path(), query)),
        None => Ok(url.path().to_string()),
    }
}
