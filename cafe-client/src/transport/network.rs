// 网络传输 - reqwest

use async_trait::async_trait;
use http::Method;
use reqwest::Client;
use serde_json::Value;

use super::{HttpTransport, parse_envelope};
use crate::{ClientConfig, ClientResult};

/// 网络 HTTP 传输
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    client: Client,
    base_url: String,
}

impl NetworkTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for NetworkTransport {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> ClientResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        parse_envelope(status, &bytes)
    }
}
