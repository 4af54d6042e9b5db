//! HTTP fetch capability and its reqwest-backed client.
//!
//! Requests are single-shot: no retries, and no timeout unless one is
//! configured. A slow request blocks only the sequence that issued it.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{ToolsError, ToolsResult};

/// HTTP method of a [`FetchRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outbound request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Something that can perform an HTTP request and hand back the whole body.
///
/// Transport failures surface as [`ToolsError::Network`]; any HTTP status,
/// including errors, is a successful fetch.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> ToolsResult<FetchResponse>;
}

/// HTTP client wrapping reqwest.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with a desktop Chrome user-agent and no timeout.
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Create a client, optionally bounding every request.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        Self {
            client: builder.build().unwrap_or_default(),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn fetch(&self, request: FetchRequest) -> ToolsResult<FetchResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ToolsError::Network(format!("request to {} failed: {e}", request.url)))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ToolsError::Network(format!("failed to read response body: {e}")))?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "fetch complete");
        Ok(FetchResponse { status, body })
    }
}
