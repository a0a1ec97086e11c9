//! Session manager: credential checks, header selection and the handshake.
//!
//! The handshake runs three dependent calls, in order:
//! 1. identity (`/api/app/me`) -> `metadata.user`
//! 2. project metadata (`/settings/project/{id}/metadata`) -> org id, secrets,
//!    `metadata.project`
//! 3. supplementary project metadata (`/api/app/projects/{id}/metadata`) ->
//!    global workspace id, merged over `metadata.project`
//!
//! Each step commits its writes only after its own call succeeded. A failure
//! aborts the handshake; writes from earlier steps stay.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::metrics::RequestMetrics;
use crate::sdk::credentials::{AuthHeaders, Credentials};
use crate::sdk::endpoints::Endpoints;
use crate::sdk::transport::{ApiRequest, Transport};
use crate::sdk::types::{HeaderKind, Headers, Metadata, HEADER_PRECEDENCE};

/// Mutable state produced by the handshake.
#[derive(Default)]
struct SessionState {
    authenticated: bool,
    metadata: Arc<Metadata>,
    headers: AuthHeaders,
    org_id: Option<String>,
    org_name: Option<String>,
    api_secret: Option<String>,
    token: Option<String>,
    api_key: Option<String>,
    workspace_id: Option<String>,
}

/// Fields pulled out of the project metadata response.
#[derive(Debug, Default)]
struct ProjectFacts {
    org_id: Option<String>,
    org_name: Option<String>,
    api_secret: Option<String>,
    token: Option<String>,
    api_key: Option<String>,
}

/// An authenticated (or not yet authenticated) connection to one project.
pub struct Session {
    credentials: Credentials,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    metrics: Arc<RequestMetrics>,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("endpoints", &self.endpoints)
            .field("authenticated", &self.state.authenticated)
            .field("headers", &self.state.headers)
            .field("org_id", &self.state.org_id)
            .field("workspace_id", &self.state.workspace_id)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session. No network activity happens until the handshake.
    pub fn new(
        credentials: Credentials,
        endpoints: Endpoints,
        transport: Arc<dyn Transport>,
        metrics: Arc<RequestMetrics>,
    ) -> Self {
        Self {
            credentials,
            endpoints,
            transport,
            metrics,
            state: SessionState::default(),
        }
    }

    /// Seed ids the caller already knows. The handshake may overwrite them.
    pub(crate) fn with_known_ids(mut self, org_id: Option<String>, workspace_id: Option<String>) -> Self {
        self.state.org_id = org_id;
        self.state.workspace_id = workspace_id;
        self
    }

    /// Seed the project token / secret the caller already knows.
    pub(crate) fn with_known_secrets(mut self, token: Option<String>, api_secret: Option<String>) -> Self {
        self.state.token = token;
        self.state.api_secret = api_secret;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn project_id(&self) -> Option<&str> {
        self.credentials.project_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn metadata(&self) -> Arc<Metadata> {
        Arc::clone(&self.state.metadata)
    }

    pub fn org_id(&self) -> Option<&str> {
        self.state.org_id.as_deref()
    }

    pub fn org_name(&self) -> Option<&str> {
        self.state.org_name.as_deref()
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.state.workspace_id.as_deref()
    }

    pub fn api_secret(&self) -> Option<&str> {
        self.state.api_secret.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.state.api_key.as_deref()
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub(crate) fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    /// Pick the header set for a request.
    ///
    /// 1. A manual override always wins.
    /// 2. An explicit kind returns that set, or an empty map if it was never
    ///    derived.
    /// 3. Otherwise the first derived set in [`HEADER_PRECEDENCE`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeadersNotFound`] when nothing resolves, which means
    /// the handshake never ran.
    pub fn resolve_headers(&self, kind: Option<HeaderKind>) -> Result<Headers> {
        if let Some(headers) = &self.credentials.header_override {
            return Ok(headers.clone());
        }

        if let Some(kind) = kind {
            return Ok(self.derived(kind).cloned().unwrap_or_default());
        }

        HEADER_PRECEDENCE
            .iter()
            .find_map(|kind| self.derived(*kind))
            .cloned()
            .ok_or(Error::HeadersNotFound(kind))
    }

    fn derived(&self, kind: HeaderKind) -> Option<&Headers> {
        match kind {
            HeaderKind::ServiceAccount => self.state.headers.service_account.as_ref(),
            HeaderKind::AccessToken => self.state.headers.access_token.as_ref(),
        }
    }

    /// Run the handshake unless it already succeeded.
    ///
    /// Returns the same `Arc<Metadata>` on every call after the first success.
    ///
    /// # Errors
    ///
    /// [`Error::MissingCredentials`] and [`Error::MissingProjectId`] before any
    /// network call; [`Error::UpstreamRequestFailed`] from any of the three
    /// handshake calls.
    pub async fn ensure_authenticated(&mut self) -> Result<Arc<Metadata>> {
        if self.state.authenticated && !self.state.metadata.is_empty() {
            return Ok(self.metadata());
        }

        let project_id = self.credentials.validate()?.to_string();
        self.state.headers = AuthHeaders::derive(&self.credentials)?;

        let user = self
            .fetch_results(self.endpoints.me(), None)
            .await
            .inspect_err(|e| error!("user auth error: {}", e))?;
        Arc::make_mut(&mut self.state.metadata).user = Some(user);

        self.load_project(&project_id)
            .await
            .inspect_err(|e| error!("project auth error: {}", e))?;

        self.state.authenticated = true;
        self.metrics.inc_handshakes();
        info!(
            "Authenticated project {} (org {:?}, workspace {:?})",
            project_id, self.state.org_id, self.state.workspace_id
        );
        Ok(self.metadata())
    }

    /// Handshake steps 2 and 3.
    async fn load_project(&mut self, project_id: &str) -> Result<()> {
        // Service account header specifically; token-only sessions fall back
        // to the preferred set.
        let kind = self
            .state
            .headers
            .service_account
            .as_ref()
            .map(|_| HeaderKind::ServiceAccount);
        let results = self
            .fetch_results(self.endpoints.project_metadata(project_id), kind)
            .await?;
        let project = into_object(results);
        let facts = ProjectFacts::from_metadata(&project);

        self.state.org_id = facts.org_id.or(self.state.org_id.take());
        self.state.org_name = facts.org_name;
        self.state.api_secret = facts.api_secret.or(self.state.api_secret.take());
        self.state.token = facts.token.or(self.state.token.take());
        self.state.api_key = facts.api_key;
        Arc::make_mut(&mut self.state.metadata).project = Some(project);

        let also = into_object(
            self.fetch_results(self.endpoints.project_metadata_also(project_id), None)
                .await?,
        );
        if let Some(workspace_id) = also.get("workspaces").and_then(global_workspace_id) {
            debug!("Global workspace: {}", workspace_id);
            self.state.workspace_id = Some(workspace_id);
        }

        let metadata = Arc::make_mut(&mut self.state.metadata);
        let merged = metadata.project.get_or_insert_with(Map::new);
        for (key, value) in also {
            merged.insert(key, value);
        }

        Ok(())
    }

    /// GET a handshake endpoint and unwrap its `results` envelope.
    async fn fetch_results(&self, url: String, kind: Option<HeaderKind>) -> Result<Value> {
        let headers = self.resolve_headers(kind)?;
        let response = send_counted(
            self.transport.as_ref(),
            &self.metrics,
            ApiRequest::get(url, headers),
        )
        .await?;
        Ok(take_results(response))
    }
}

impl ProjectFacts {
    fn from_metadata(project: &Map<String, Value>) -> Self {
        Self {
            org_id: project.get("organizationId").and_then(id_string),
            org_name: project.get("organizationName").and_then(id_string),
            api_secret: project.get("secret").and_then(id_string),
            token: project.get("token").and_then(id_string),
            api_key: project.get("api_key").and_then(id_string),
        }
    }
}

/// Send one request through `transport`, counting it.
pub(crate) async fn send_counted(
    transport: &dyn Transport,
    metrics: &RequestMetrics,
    request: ApiRequest,
) -> Result<Value> {
    metrics.inc_requests();
    let result = transport.send(request).await;
    if result.is_err() {
        metrics.inc_failed();
    }
    result
}

/// Unwrap the `results` envelope, or `null` if there is none.
pub fn take_results(response: Value) -> Value {
    match response {
        Value::Object(mut map) => map.remove("results").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Render a string or numeric id as a string.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Id of the first workspace entry whose `is_global` is exactly `true`.
///
/// Entries are scanned in response order, whether the server sent them as an
/// object keyed by workspace or as an array.
pub fn global_workspace_id(workspaces: &Value) -> Option<String> {
    let entries: Box<dyn Iterator<Item = &Value>> = match workspaces {
        Value::Object(map) => Box::new(map.values()),
        Value::Array(items) => Box::new(items.iter()),
        _ => return None,
    };

    entries
        .filter(|entry| entry.get("is_global") == Some(&Value::Bool(true)))
        .find_map(|entry| entry.get("id").and_then(id_string))
}
