//! Chrome DevTools HTTP endpoint client
//!
//! Covers the `/json/*` listing and tab management endpoints. Expression
//! evaluation goes through the tab's WebSocket (see [`crate::cdp`]).

use std::time::Duration;

use async_trait::async_trait;
use clip_core::{Browser, BrowserConfig, Error, Result, Tab};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::cdp;

/// Client for a browser's remote debugging port
pub struct DevToolsClient {
    http_client: Client,
    base_url: Url,
    port: u16,
    connect_timeout: Duration,
    eval_timeout: Duration,
}

impl DevToolsClient {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let http_client = Client::builder()
            .no_proxy()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url()?,
            port: config.port,
            connect_timeout: config.connect_timeout,
            eval_timeout: config.eval_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn request(&self, method: reqwest::Method, path: &str) -> Result<String> {
        let url = self.endpoint(path);
        tracing::debug!(method = %method, url = %url, "DevTools request");

        let response = self
            .http_client
            .request(method, &url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("DevTools request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read DevTools response: {e}")))?;
        if status >= 400 {
            return Err(Error::from_response(status, &text));
        }
        Ok(text)
    }

    async fn request_json(&self, method: reqwest::Method, path: &str) -> Result<Value> {
        let text = self.request(method, path).await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::MalformedResponse(format!("Expected JSON from {path}: {e}"))
        })
    }
}

#[async_trait]
impl Browser for DevToolsClient {
    fn port(&self) -> u16 {
        self.port
    }

    async fn version(&self) -> Result<Value> {
        self.request_json(reqwest::Method::GET, "/json/version").await
    }

    async fn tabs(&self) -> Result<Vec<Tab>> {
        let value = self.request_json(reqwest::Method::GET, "/json/list").await?;
        if !value.is_array() {
            return Err(Error::MalformedResponse(
                "Expected an array of tabs from /json/list".into(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::MalformedResponse(format!("Unexpected tab listing: {e}")))
    }

    async fn open(&self, url: &str) -> Result<Tab> {
        let path = format!("/json/new?{}", urlencoding::encode(url));
        let value = self.request_json(reqwest::Method::PUT, &path).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::MalformedResponse(format!("Unexpected new tab response: {e}")))
    }

    async fn activate(&self, id: &str) -> Result<()> {
        let path = format!("/json/activate/{}", urlencoding::encode(id));
        self.request(reqwest::Method::PUT, &path).await?;
        Ok(())
    }

    async fn close(&self, id: &str) -> Result<()> {
        let path = format!("/json/close/{}", urlencoding::encode(id));
        self.request(reqwest::Method::PUT, &path).await?;
        Ok(())
    }

    async fn evaluate(&self, tab: &Tab, expression: &str) -> Result<Value> {
        cdp::evaluate(
            &tab.web_socket_url,
            expression,
            self.connect_timeout,
            self.eval_timeout,
        )
        .await
    }
}
