//! Recording in-memory transport for unit tests.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::sdk::transport::{ApiRequest, Transport};

enum Reply {
    Json(Value),
    Status(u16),
}

/// Canned replies keyed by exact method + URL; every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `method url` with `body`.
    pub fn on(&self, method: Method, url: impl Into<String>, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.into()), Reply::Json(body));
    }

    /// Answer `method url` with an HTTP error status.
    pub fn fail(&self, method: Method, url: impl Into<String>, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.into()), Reply::Status(status));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of recorded requests to exactly `url`.
    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let key = (request.method.clone(), request.url.clone());
        self.requests.lock().unwrap().push(request);

        // Let sibling futures in a batch start before this one finishes.
        tokio::task::yield_now().await;

        match self.routes.lock().unwrap().get(&key) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(Error::upstream(
                key.0.as_str(),
                &key.1,
                Some(*status),
                "mock failure",
            )),
            None => Err(Error::upstream(key.0.as_str(), &key.1, Some(404), "no mock route")),
        }
    }
}
