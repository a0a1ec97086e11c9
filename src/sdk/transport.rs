//! HTTP transport for the web-application API.
//!
//! The session and the asset gateway only ever talk to a [`Transport`]; the
//! production implementation is [`HttpTransport`] on top of `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::sdk::types::Headers;
use crate::VERSION;

/// User agent string for API requests.
fn user_agent() -> String {
    format!("mp-project/{} (rust)", VERSION)
}

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, headers: Headers) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers,
            body: None,
        }
    }

    /// The `Authorization` header value, if any.
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("Authorization").map(String::as_str)
    }
}

/// Sends one request and decodes the JSON reply.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue exactly one HTTP call. Non-2xx replies are errors.
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport with the crate's user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Check status and decode the body; an empty body decodes to `null`.
    async fn handle_response(method: &Method, url: &str, response: Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(
                method.as_str(),
                url,
                Some(status.as_u16()),
                format!("{} {}", status_text, body).trim_end().to_string(),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::upstream(method.as_str(), url, Some(status.as_u16()), e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::upstream(
                method.as_str(),
                url,
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e),
            )
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let request_id = Uuid::new_v4().to_string();
        debug!("{} {} (request {})", request.method, request.url, request_id);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header("X-Request-Id", &request_id);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            Error::upstream(request.method.as_str(), &request.url, None, e.to_string())
        })?;

        Self::handle_response(&request.method, &request.url, response).await
    }
}
