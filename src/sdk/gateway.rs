//! Asset gateway: one authenticated request per call.
//!
//! Every asset operation funnels through [`issue_request`]. It runs the
//! handshake if needed, merges the session headers with any extra headers,
//! strips server-managed fields from the payload and sends exactly one
//! request. Bulk child fetches go through [`fetch_batched`].

use futures::future::join_all;
use reqwest::Method;
use serde_json::Value;
use std::future::Future;
use tracing::debug;

use crate::error::Result;
use crate::sdk::sanitize::sanitize_payload;
use crate::sdk::session::{send_counted, Session};
use crate::sdk::transport::ApiRequest;
use crate::sdk::types::Headers;

/// Default number of concurrent requests per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// JSON defaults applied to requests that carry extra headers.
const JSON_DEFAULTS: [(&str, &str); 2] = [
    ("content-type", "application/json"),
    ("accept", "application/json"),
];

/// A request to an asset endpoint.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub url: String,
    pub method: Method,
    pub payload: Option<Value>,
    pub extra_headers: Headers,
    /// Strip deny-listed keys from the payload (default: true)
    pub sanitize: bool,
}

impl AssetRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            payload: None,
            extra_headers: Headers::new(),
            sanitize: true,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Send the payload exactly as given.
    pub fn unsanitized(mut self) -> Self {
        self.sanitize = false;
        self
    }
}

/// Merge session and extra headers.
///
/// When extra headers are present, JSON `content-type` / `accept` defaults
/// are filled in only where the caller did not set them (names compared
/// case-insensitively). Extra headers override session headers.
pub fn compose_headers(session_headers: Headers, extra: &Headers) -> Headers {
    let mut headers = session_headers;
    if extra.is_empty() {
        return headers;
    }

    for (name, value) in JSON_DEFAULTS {
        if !extra.keys().any(|k| k.eq_ignore_ascii_case(name)) {
            headers.insert(name.to_string(), value.to_string());
        }
    }
    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

/// Issue one authenticated request and return the decoded body as-is.
///
/// # Errors
///
/// Handshake errors, [`crate::Error::HeadersNotFound`], or
/// [`crate::Error::UpstreamRequestFailed`] from the call itself. Nothing is
/// retried.
pub async fn issue_request(session: &mut Session, request: AssetRequest) -> Result<Value> {
    session.ensure_authenticated().await?;

    let headers = compose_headers(session.resolve_headers(None)?, &request.extra_headers);
    let mut payload = request.payload;
    if request.sanitize {
        if let Some(body) = payload.as_mut() {
            sanitize_payload(body);
        }
    }

    debug!("{} {}", request.method, request.url);
    let transport = session.transport();
    send_counted(
        transport.as_ref(),
        session.metrics(),
        ApiRequest {
            method: request.method,
            url: request.url,
            headers,
            body: payload,
        },
    )
    .await
}

/// GET many URLs with the session's headers, `batch_size` at a time.
///
/// Results come back in input order.
pub async fn get_many(session: &mut Session, urls: &[String], batch_size: usize) -> Result<Vec<Value>> {
    session.ensure_authenticated().await?;

    let headers = session.resolve_headers(None)?;
    let transport = session.transport();
    let metrics = session.metrics().clone();

    fetch_batched(urls, batch_size, |url| {
        let transport = transport.clone();
        let metrics = metrics.clone();
        let request = ApiRequest::get(url.clone(), headers.clone());
        async move { send_counted(transport.as_ref(), &metrics, request).await }
    })
    .await
}

/// Run `fetch` over `items` in fixed-size concurrent batches.
///
/// Every request of a batch is awaited before the next batch starts, and all
/// of them complete even if one fails; the first error (in input order) is
/// returned. Output order matches input order.
pub async fn fetch_batched<T, F, Fut>(items: &[T], batch_size: usize, mut fetch: F) -> Result<Vec<Value>>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut results = Vec::with_capacity(items.len());

    for (i, batch) in items.chunks(batch_size.max(1)).enumerate() {
        debug!("Dispatching batch {} ({} requests)", i + 1, batch.len());
        let outcomes = join_all(batch.iter().map(&mut fetch)).await;
        for outcome in outcomes {
            results.push(outcome?);
        }
    }

    Ok(results)
}
