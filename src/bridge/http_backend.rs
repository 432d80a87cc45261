//! HTTP(S) backend: one POST per JSON-RPC message.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::bridge::backend::RpcBackend;
use crate::bridge::error::BridgeError;

#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    url: Url,
    user_agent: HeaderValue,
}

impl HttpBackend {
    pub fn new(url: Url, user_agent: &str) -> anyhow::Result<Self> {
        let user_agent = HeaderValue::from_str(user_agent)
            .with_context(|| format!("invalid user agent {user_agent:?}"))?;
        let http = reqwest::Client::builder()
            .build()
            .context("failed to create http client")?;

        Ok(HttpBackend {
            http,
            url,
            user_agent,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RpcBackend for HttpBackend {
    async fn forward(&self, message: &Value) -> Result<Value, BridgeError> {
        let body = serde_json::to_vec(message).map_err(BridgeError::Encode)?;

        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(CONTENT_LENGTH, body.len())
            .header(USER_AGENT, self.user_agent.clone())
            .body(body)
            .send()
            .await?;

        // status is not inspected; servers put JSON-RPC errors in 4xx/5xx bodies too
        let status = response.status();
        let raw = response.bytes().await?;
        debug!(%status, bytes = raw.len(), "backend responded");

        serde_json::from_slice(&raw).map_err(|_| BridgeError::InvalidResponse {
            body: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}
