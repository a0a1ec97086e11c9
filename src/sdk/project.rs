//! Project - the public client for one analytics project.
//!
//! Wraps a [`Session`] and an [`AssetCache`]. Every operation goes through
//! the asset gateway, so the first call of any kind triggers the handshake
//! and later calls reuse it.

use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::metrics::{MetricsSnapshot, RequestMetrics};
use crate::sdk::credentials::Credentials;
use crate::sdk::endpoints::{Endpoints, LexiconEntity};
use crate::sdk::gateway::{self, AssetRequest, DEFAULT_BATCH_SIZE};
use crate::sdk::sanitize::sanitize_payload;
use crate::sdk::session::{id_string, take_results, Session};
use crate::sdk::transport::{HttpTransport, Transport};
use crate::sdk::types::*;

/// Default display name.
const DEFAULT_NAME: &str = "mixpanel-project";

/// Palette used by [`Project::set_theme`] when no colors are given.
pub const DEFAULT_THEME_COLORS: [&str; 12] = [
    "#6AFF57", "#57443F", "#3B7974", "#826018", "#731128", "#3B586C", "#593419", "#0D7EA0",
    "#1A804F", "#BB4434", "#070208", "#05433E",
];

/// Previously fetched collections, per asset kind.
///
/// `None` means "not fetched yet"; an empty collection is a valid cached value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCache {
    pub schema: Option<Value>,
    pub dashboards: Option<Vec<Value>>,
    pub reports: Option<Vec<Value>>,
    pub cohorts: Option<Vec<Value>>,
    pub custom_events: Option<Vec<Value>>,
    pub custom_props: Option<Vec<Value>>,
    pub formulas: Option<Vec<Value>>,
    pub users: Option<Vec<Value>>,
}

impl AssetCache {
    /// Forget everything fetched so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the given kind has been fetched.
    pub fn is_cached(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Schema => self.schema.is_some(),
            AssetKind::Dashboards => self.dashboards.is_some(),
            AssetKind::Reports => self.reports.is_some(),
            AssetKind::Cohorts => self.cohorts.is_some(),
            AssetKind::CustomEvents => self.custom_events.is_some(),
            AssetKind::CustomProps => self.custom_props.is_some(),
            AssetKind::Formulas => self.formulas.is_some(),
            AssetKind::Users => self.users.is_some(),
        }
    }

    fn list_mut(&mut self, kind: AssetKind) -> Option<&mut Option<Vec<Value>>> {
        match kind {
            AssetKind::Schema => None,
            AssetKind::Dashboards => Some(&mut self.dashboards),
            AssetKind::Reports => Some(&mut self.reports),
            AssetKind::Cohorts => Some(&mut self.cohorts),
            AssetKind::CustomEvents => Some(&mut self.custom_events),
            AssetKind::CustomProps => Some(&mut self.custom_props),
            AssetKind::Formulas => Some(&mut self.formulas),
            AssetKind::Users => Some(&mut self.users),
        }
    }
}

/// Client for one analytics project.
#[derive(Debug)]
pub struct Project {
    name: String,
    write_path: PathBuf,
    batch_size: usize,
    session: Session,
    assets: AssetCache,
}

impl Project {
    /// Create a project client backed by the real HTTP transport.
    ///
    /// Fields left unset in `options` fall back to `MP_*` environment
    /// variables (see [`ProjectOptions::with_env_fallback`]).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] or a failure to build the HTTP client.
    pub fn new(options: ProjectOptions) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::with_transport(options.with_env_fallback(), transport)
    }

    /// Create a project client over any transport. `options` are used as
    /// given, without environment fallback.
    pub fn with_transport(options: ProjectOptions, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = Credentials::from_options(&options)?;
        let endpoints = match options.api_host.as_deref() {
            Some(host) if !host.is_empty() => Endpoints::with_base(host),
            _ => Endpoints::new(credentials.region),
        };

        let session = Session::new(credentials, endpoints, transport, RequestMetrics::new())
            .with_known_ids(options.org_id, options.workspace_id)
            .with_known_secrets(options.token, options.api_secret);

        Ok(Self {
            name: options.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            write_path: options.write_path.unwrap_or_else(std::env::temp_dir),
            batch_size: options.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
            session,
            assets: AssetCache::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write_path(&self) -> &Path {
        &self.write_path
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.session.metrics().snapshot()
    }

    /// Run the handshake (once) and return the session metadata.
    pub async fn auth(&mut self) -> Result<Arc<Metadata>> {
        self.session.ensure_authenticated().await
    }

    /// Issue one authenticated request through the gateway.
    pub async fn request(&mut self, request: AssetRequest) -> Result<Value> {
        gateway::issue_request(&mut self.session, request).await
    }

    /// Reset the asset cache. Authentication state is kept.
    pub fn clear_assets(&mut self) {
        self.assets.clear();
    }

    /// Authenticate, then return the project id.
    async fn project_scope(&mut self) -> Result<String> {
        self.auth().await?;
        self.session
            .project_id()
            .map(String::from)
            .ok_or(Error::MissingProjectId)
    }

    /// Authenticate, then return (project id, global workspace id).
    async fn scope(&mut self) -> Result<(String, String)> {
        let project_id = self.project_scope().await?;
        let workspace_id = self
            .session
            .workspace_id()
            .ok_or_else(|| Error::Internal("no global workspace found for project".to_string()))?
            .to_string();
        Ok((project_id, workspace_id))
    }

    /// GET a list endpoint once per kind; later calls hit the cache.
    async fn cached_list(&mut self, kind: AssetKind, url: String, key: &str) -> Result<Vec<Value>> {
        if let Some(Some(cached)) = self.assets.list_mut(kind).map(|slot| slot.as_ref()) {
            return Ok(cached.clone());
        }

        let response = self.request(AssetRequest::get(url)).await?;
        let items = into_list(response.get(key).cloned().unwrap_or(Value::Null));
        debug!("Fetched {} {:?}", items.len(), kind);

        if let Some(slot) = self.assets.list_mut(kind) {
            *slot = Some(items.clone());
        }
        Ok(items)
    }

    // ===== Dashboards & reports =====

    /// All dashboards with their full contents.
    ///
    /// Lists dashboard ids, then fetches each dashboard in batches. Reports
    /// embedded in each dashboard are collected into the reports cache.
    pub async fn get_dashboards(&mut self) -> Result<Vec<Value>> {
        if let Some(cached) = &self.assets.dashboards {
            return Ok(cached.clone());
        }
        let (_, workspace_id) = self.scope().await?;

        let url = self.session.endpoints().dashboards(&workspace_id);
        let listing = self.request(AssetRequest::get(url)).await?;
        let urls: Vec<String> = into_list(take_results(listing))
            .iter()
            .filter_map(|d| d.get("id").and_then(id_string))
            .map(|id| self.session.endpoints().dashboard(&workspace_id, &id))
            .collect();

        let dashboards: Vec<Value> = gateway::get_many(&mut self.session, &urls, self.batch_size)
            .await?
            .into_iter()
            .map(take_results)
            .collect();

        let reports = self.assets.reports.get_or_insert_with(Vec::new);
        for dash in &dashboards {
            if let Some(Value::Object(embedded)) = dash.pointer("/contents/report") {
                reports.extend(embedded.values().cloned());
            }
        }

        info!("Fetched {} dashboards", dashboards.len());
        self.assets.dashboards = Some(dashboards.clone());
        Ok(dashboards)
    }

    /// One dashboard, uncached.
    pub async fn get_dashboard(&mut self, dash_id: &str) -> Result<Value> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().dashboard(&workspace_id, dash_id);
        self.request(AssetRequest::get(url)).await
    }

    /// Create, title, share and pin a new dashboard.
    pub async fn create_dashboard(&mut self, title: &str, description: &str) -> Result<CreatedDashboard> {
        let (project_id, workspace_id) = self.scope().await?;
        let endpoints = self.session.endpoints().clone();

        let create = self
            .request(AssetRequest::post(endpoints.dashboards(&workspace_id)).payload(json!({"title": "Untitled"})))
            .await?;
        let dash_id = create
            .get("id")
            .or_else(|| create.pointer("/results/id"))
            .and_then(id_string)
            .ok_or_else(|| Error::Internal("dashboard create response has no id".to_string()))?;

        let edit = self
            .request(
                AssetRequest::patch(endpoints.dashboard(&workspace_id, &dash_id))
                    .payload(json!({"title": title, "description": description})),
            )
            .await?;

        // The share payload must carry ids, which the deny-list would strip.
        let share = self
            .request(
                AssetRequest::post(endpoints.share_dashboard(&project_id, &dash_id))
                    .payload(json!({
                        "id": numeric_id(&dash_id),
                        "projectShares": [{"id": numeric_id(&project_id), "canEdit": true}]
                    }))
                    .unsanitized(),
            )
            .await?;

        let pin = self
            .request(AssetRequest::post(endpoints.pin_dashboard(&workspace_id, &dash_id)).payload(json!({})))
            .await?;

        if let Some(dashboards) = self.assets.dashboards.as_mut() {
            dashboards.push(take_results(edit.clone()));
        }
        info!("Created dashboard {} ({})", dash_id, title);
        Ok(CreatedDashboard {
            create,
            edit,
            share,
            pin,
        })
    }

    pub async fn delete_dashboard(&mut self, dash_id: &str) -> Result<Value> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().dashboard(&workspace_id, dash_id);
        self.request(AssetRequest::delete(url)).await
    }

    /// Reports seen inside dashboards; fetches dashboards if needed.
    pub async fn get_reports(&mut self) -> Result<Vec<Value>> {
        if self.assets.reports.is_none() {
            self.get_dashboards().await?;
        }
        Ok(self.assets.reports.clone().unwrap_or_default())
    }

    pub async fn get_report(&mut self, report_id: &str) -> Result<Value> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().report(&workspace_id, report_id);
        self.request(AssetRequest::get(url)).await
    }

    /// Add a report to a dashboard. `bookmark` is the report definition
    /// (`type`, `name`, `description`, `params`).
    ///
    /// The bookmark is sanitized on its own and then tagged with the target
    /// dashboard, so the envelope goes out as built.
    pub async fn create_report(&mut self, dash_id: &str, mut bookmark: Value) -> Result<Value> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().dashboard(&workspace_id, dash_id);

        sanitize_payload(&mut bookmark);
        if let Value::Object(fields) = &mut bookmark {
            fields.insert("dashboard_id".to_string(), numeric_id(dash_id));
        }
        let payload = json!({
            "content": {
                "action": "create",
                "content_type": "report",
                "content_params": {"bookmark": bookmark}
            }
        });
        self.request(AssetRequest::patch(url).payload(payload).unsanitized())
            .await
    }

    /// Remove a report from a dashboard.
    pub async fn delete_report(&mut self, dash_id: &str, report_id: &str) -> Result<Value> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().dashboard(&workspace_id, dash_id);
        let payload = json!({
            "content": {
                "action": "delete",
                "content_id": report_id,
                "content_type": "report"
            }
        });
        self.request(AssetRequest::patch(url).payload(payload)).await
    }

    // ===== Cohorts, custom events, custom properties =====

    pub async fn get_cohorts(&mut self) -> Result<Vec<Value>> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().cohorts(&workspace_id);
        self.cached_list(AssetKind::Cohorts, url, "results").await
    }

    pub async fn get_cohort(&mut self, cohort_id: &str) -> Result<Option<Value>> {
        Ok(find_by_id(self.get_cohorts().await?, cohort_id))
    }

    pub async fn get_custom_events(&mut self) -> Result<Vec<Value>> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().custom_events(&workspace_id);
        self.cached_list(AssetKind::CustomEvents, url, "custom_events").await
    }

    pub async fn get_custom_event(&mut self, custom_event_id: &str) -> Result<Option<Value>> {
        Ok(find_by_id(self.get_custom_events().await?, custom_event_id))
    }

    pub async fn get_custom_props(&mut self) -> Result<Vec<Value>> {
        let (_, workspace_id) = self.scope().await?;
        let url = self.session.endpoints().custom_props(&workspace_id);
        self.cached_list(AssetKind::CustomProps, url, "results").await
    }

    pub async fn get_custom_prop(&mut self, custom_prop_id: &str) -> Result<Option<Value>> {
        Ok(find_by_id(self.get_custom_props().await?, custom_prop_id))
    }

    // ===== Formulas & users =====

    pub async fn get_formulas(&mut self) -> Result<Vec<Value>> {
        let project_id = self.project_scope().await?;
        let url = self.session.endpoints().formulas(&project_id);
        self.cached_list(AssetKind::Formulas, url, "results").await
    }

    pub async fn get_formula(&mut self, formula_id: &str) -> Result<Option<Value>> {
        Ok(find_by_id(self.get_formulas().await?, formula_id))
    }

    pub async fn get_users(&mut self) -> Result<Vec<Value>> {
        let project_id = self.project_scope().await?;
        let url = self.session.endpoints().users(&project_id);
        self.cached_list(AssetKind::Users, url, "results").await
    }

    pub async fn get_user(&mut self, user_id: &str) -> Result<Option<Value>> {
        Ok(find_by_id(self.get_users().await?, user_id))
    }

    // ===== Schema & themes =====

    /// Lexicon schema: events, event properties and user properties.
    pub async fn get_schema(&mut self) -> Result<Value> {
        if let Some(schema) = &self.assets.schema {
            return Ok(schema.clone());
        }
        let (project_id, workspace_id) = self.scope().await?;
        let endpoints = self.session.endpoints().clone();

        let mut schema = Map::new();
        for (key, entity) in [
            ("event", LexiconEntity::Events),
            ("properties", LexiconEntity::EventProperties),
            ("users", LexiconEntity::UserProperties),
        ] {
            let url = endpoints.lexicon(&project_id, &workspace_id, entity);
            let response = self.request(AssetRequest::get(url)).await?;
            schema.insert(key.to_string(), take_results(response));
        }

        let schema = Value::Object(schema);
        self.assets.schema = Some(schema.clone());
        Ok(schema)
    }

    /// Save a categorical color theme for the project.
    pub async fn set_theme(&mut self, name: &str, colors: &[String]) -> Result<Value> {
        let project_id = self.project_scope().await?;
        let colors: Vec<String> = if colors.is_empty() {
            DEFAULT_THEME_COLORS.iter().map(|c| c.to_string()).collect()
        } else {
            colors.to_vec()
        };
        let payload = json!({
            "type": "categorical",
            "name": name,
            "data": {"colors": colors},
            "global_access_type": "editor"
        });
        let url = self.session.endpoints().themes(&project_id);
        self.request(AssetRequest::post(url).payload(payload)).await
    }

    // ===== Bulk =====

    /// Fetch one kind by name.
    pub async fn get_kind(&mut self, kind: AssetKind) -> Result<Value> {
        Ok(match kind {
            AssetKind::Schema => self.get_schema().await?,
            AssetKind::Dashboards => Value::Array(self.get_dashboards().await?),
            AssetKind::Reports => Value::Array(self.get_reports().await?),
            AssetKind::Cohorts => Value::Array(self.get_cohorts().await?),
            AssetKind::CustomEvents => Value::Array(self.get_custom_events().await?),
            AssetKind::CustomProps => Value::Array(self.get_custom_props().await?),
            AssetKind::Formulas => Value::Array(self.get_formulas().await?),
            AssetKind::Users => Value::Array(self.get_users().await?),
        })
    }

    /// Clear the cache and fetch every asset kind fresh.
    pub async fn get_all(&mut self) -> Result<AllAssets> {
        self.clear_assets();
        Ok(AllAssets {
            schema: self.get_schema().await?,
            dashboards: self.get_dashboards().await?,
            cohorts: self.get_cohorts().await?,
            custom_events: self.get_custom_events().await?,
            custom_props: self.get_custom_props().await?,
            formulas: self.get_formulas().await?,
            users: self.get_users().await?,
        })
    }

    /// Delete every dashboard, one at a time.
    pub async fn delete_all(&mut self) -> Result<DeletedAssets> {
        let all = self.get_all().await?;
        let mut deleted = DeletedAssets::default();

        for dash in &all.dashboards {
            if let Some(id) = dash.get("id").and_then(id_string) {
                deleted.dashboards.push(self.delete_dashboard(&id).await?);
            }
        }

        self.clear_assets();
        info!("Deleted {} dashboards", deleted.dashboards.len());
        Ok(deleted)
    }
}

/// Flatten a list-ish response into items.
fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    }
}

/// Ids go out as numbers when they look like numbers.
fn numeric_id(id: &str) -> Value {
    id.parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(id))
}

fn find_by_id(items: Vec<Value>, id: &str) -> Option<Value> {
    items
        .into_iter()
        .find(|item| item.get("id").and_then(id_string).as_deref() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::testing::MockTransport;
    use reqwest::Method;

    const WS: &str = "42";

    fn endpoints() -> Endpoints {
        Endpoints::new(Region::Us)
    }

    fn mocked() -> Arc<MockTransport> {
        let transport = MockTransport::new();
        let e = endpoints();
        transport.on(Method::GET, e.me(), json!({"results": {"user_id": 1}}));
        transport.on(
            Method::GET,
            e.project_metadata("1234"),
            json!({"results": {"id": 1234, "organizationId": 9}}),
        );
        transport.on(
            Method::GET,
            e.project_metadata_also("1234"),
            json!({"results": {"workspaces": {"A": {"id": 41, "is_global": false}, "B": {"id": 42, "is_global": true}}}}),
        );
        transport
    }

    fn project(transport: &Arc<MockTransport>) -> Project {
        Project::with_transport(
            ProjectOptions {
                project_id: Some("1234".to_string()),
                access_token: Some("tok".to_string()),
                ..Default::default()
            },
            transport.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let transport = MockTransport::new();
        let project = project(&transport);

        assert_eq!(project.name(), DEFAULT_NAME);
        assert_eq!(project.write_path(), std::env::temp_dir().as_path());
        assert_eq!(project.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!project.session().is_authenticated());
        assert_eq!(project.assets(), &AssetCache::default());
    }

    #[test]
    fn test_api_host_override_skips_region_prefix() {
        let project = Project::with_transport(
            ProjectOptions {
                region: Some("EU".to_string()),
                api_host: Some("http://127.0.0.1:3000".to_string()),
                ..Default::default()
            },
            MockTransport::new(),
        )
        .unwrap();

        assert_eq!(project.session().endpoints().base(), "http://127.0.0.1:3000");
    }

    #[tokio::test]
    async fn test_auth_then_fetch_does_not_repeat_handshake() {
        let transport = mocked();
        transport.on(
            Method::GET,
            endpoints().cohorts(WS),
            json!({"results": [{"id": 1, "name": "Power users"}]}),
        );
        let mut project = project(&transport);

        let metadata = project.auth().await.unwrap();
        assert!(project.session().is_authenticated());
        assert!(metadata.user.is_some());

        let cohorts = project.get_cohorts().await.unwrap();
        assert_eq!(cohorts.len(), 1);
        assert_eq!(transport.calls_to(&endpoints().me()), 1);
    }

    #[tokio::test]
    async fn test_list_cache_and_clear() {
        let transport = mocked();
        let url = endpoints().formulas("1234");
        transport.on(Method::GET, url.clone(), json!({"results": []}));
        let mut project = project(&transport);

        assert!(project.get_formulas().await.unwrap().is_empty());
        assert!(project.get_formulas().await.unwrap().is_empty());
        assert_eq!(transport.calls_to(&url), 1);
        assert!(project.assets().is_cached(AssetKind::Formulas));

        project.clear_assets();
        assert!(!project.assets().is_cached(AssetKind::Formulas));
        assert!(project.session().is_authenticated());

        project.get_formulas().await.unwrap();
        assert_eq!(transport.calls_to(&url), 2);
        assert_eq!(transport.calls_to(&endpoints().me()), 1);
    }

    #[tokio::test]
    async fn test_custom_events_use_own_envelope() {
        let transport = mocked();
        transport.on(
            Method::GET,
            endpoints().custom_events(WS),
            json!({"custom_events": [{"id": 5, "name": "Signup"}, {"id": "6", "name": "Churn"}]}),
        );
        let mut project = project(&transport);

        let event = project.get_custom_event("6").await.unwrap().unwrap();
        assert_eq!(event["name"], "Churn");
        assert!(project.get_custom_event("7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dashboards_are_batched_and_reports_collected() {
        let transport = mocked();
        let e = endpoints();
        let ids: Vec<u32> = (1..=25).collect();
        transport.on(
            Method::GET,
            e.dashboards(WS),
            json!({"results": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>()}),
        );
        for id in &ids {
            let mut reports = Map::new();
            reports.insert(format!("r{}", id), json!({"id": id * 100}));
            transport.on(
                Method::GET,
                e.dashboard(WS, &id.to_string()),
                json!({"results": {"id": id, "contents": {"report": reports}}}),
            );
        }
        let mut project = project(&transport);

        let dashboards = project.get_dashboards().await.unwrap();

        let got: Vec<u64> = dashboards.iter().map(|d| d["id"].as_u64().unwrap()).collect();
        assert_eq!(got, ids.iter().map(|id| *id as u64).collect::<Vec<_>>());
        assert_eq!(project.get_reports().await.unwrap().len(), 25);

        // Second call is served from the cache.
        let before = transport.call_count();
        project.get_dashboards().await.unwrap();
        assert_eq!(transport.call_count(), before);
    }

    #[tokio::test]
    async fn test_schema_assembled_from_lexicon() {
        let transport = mocked();
        let e = endpoints();
        transport.on(
            Method::GET,
            e.lexicon("1234", WS, LexiconEntity::Events),
            json!({"results": [{"name": "Signup"}]}),
        );
        transport.on(
            Method::GET,
            e.lexicon("1234", WS, LexiconEntity::EventProperties),
            json!({"results": [{"name": "plan"}]}),
        );
        transport.on(
            Method::GET,
            e.lexicon("1234", WS, LexiconEntity::UserProperties),
            json!({"results": []}),
        );
        let mut project = project(&transport);

        let schema = project.get_schema().await.unwrap();
        assert_eq!(schema["event"][0]["name"], "Signup");
        assert_eq!(schema["properties"][0]["name"], "plan");
        assert_eq!(schema["users"], json!([]));
        assert_eq!(project.assets().schema.as_ref(), Some(&schema));
    }

    #[tokio::test]
    async fn test_create_dashboard_sequence() {
        let transport = mocked();
        let e = endpoints();
        transport.on(Method::POST, e.dashboards(WS), json!({"results": {"id": 77}}));
        transport.on(Method::PATCH, e.dashboard(WS, "77"), json!({"results": {"id": 77, "title": "Ops"}}));
        transport.on(Method::POST, e.share_dashboard("1234", "77"), json!({"status": "ok"}));
        transport.on(Method::POST, e.pin_dashboard(WS, "77"), json!({"status": "ok"}));
        let mut project = project(&transport);

        let created = project.create_dashboard("Ops", "ops board").await.unwrap();
        assert_eq!(created.edit["results"]["title"], "Ops");

        let requests = transport.requests();
        let share = requests
            .iter()
            .find(|r| r.url == e.share_dashboard("1234", "77"))
            .unwrap();
        assert_eq!(
            share.body,
            Some(json!({"id": 77, "projectShares": [{"id": 1234, "canEdit": true}]}))
        );
        let edit = requests.iter().find(|r| r.method == Method::PATCH).unwrap();
        assert_eq!(edit.body, Some(json!({"title": "Ops", "description": "ops board"})));
    }

    #[tokio::test]
    async fn test_delete_report_payload() {
        let transport = mocked();
        transport.on(Method::PATCH, endpoints().dashboard(WS, "3"), json!({"status": "ok"}));
        let mut project = project(&transport);

        project.delete_report("3", "900").await.unwrap();

        let sent = transport.requests().pop().unwrap();
        assert_eq!(
            sent.body,
            Some(json!({"content": {"action": "delete", "content_id": "900", "content_type": "report"}}))
        );
    }

    #[tokio::test]
    async fn test_create_report_keeps_dashboard_id_in_bookmark() {
        let transport = mocked();
        transport.on(Method::PATCH, endpoints().dashboard(WS, "3"), json!({"status": "ok"}));
        let mut project = project(&transport);

        project
            .create_report(
                "3",
                json!({"type": "insights", "name": "r", "id": 55, "creator": "y", "params": "{}"}),
            )
            .await
            .unwrap();

        let sent = transport.requests().pop().unwrap();
        assert_eq!(
            sent.body,
            Some(json!({"content": {
                "action": "create",
                "content_type": "report",
                "content_params": {"bookmark": {
                    "type": "insights",
                    "name": "r",
                    "params": "{}",
                    "dashboard_id": 3
                }}
            }}))
        );
    }

    #[tokio::test]
    async fn test_project_level_ops_without_global_workspace() {
        let transport = MockTransport::new();
        let e = endpoints();
        transport.on(Method::GET, e.me(), json!({"results": {"user_id": 1}}));
        transport.on(Method::GET, e.project_metadata("1234"), json!({"results": {"id": 1234}}));
        transport.on(
            Method::GET,
            e.project_metadata_also("1234"),
            json!({"results": {"workspaces": {"B": {"id": 42, "is_global": false}}}}),
        );
        transport.on(Method::GET, e.formulas("1234"), json!({"results": [{"id": 8, "name": "ARPU"}]}));
        transport.on(Method::GET, e.users("1234"), json!({"results": [{"id": 2}]}));
        transport.on(Method::POST, e.themes("1234"), json!({"results": {"ok": true}}));
        let mut project = project(&transport);

        assert_eq!(project.get_formula("8").await.unwrap().unwrap()["name"], "ARPU");
        assert_eq!(project.get_users().await.unwrap().len(), 1);
        project.set_theme("brand", &[]).await.unwrap();
        assert!(project.session().workspace_id().is_none());

        // Workspace-scoped kinds still refuse to run.
        assert!(matches!(
            project.get_cohorts().await.unwrap_err(),
            Error::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_set_theme_default_palette() {
        let transport = mocked();
        transport.on(Method::POST, endpoints().themes("1234"), json!({"results": {"ok": true}}));
        let mut project = project(&transport);

        project.set_theme("brand", &[]).await.unwrap();

        let sent = transport.requests().pop().unwrap();
        let body = sent.body.unwrap();
        assert_eq!(body["data"]["colors"].as_array().unwrap().len(), 12);
        assert_eq!(body["name"], "brand");
    }

    #[tokio::test]
    async fn test_delete_all_removes_dashboards() {
        let transport = mocked();
        let e = endpoints();
        transport.on(Method::GET, e.dashboards(WS), json!({"results": [{"id": 1}, {"id": 2}]}));
        for id in ["1", "2"] {
            transport.on(Method::GET, e.dashboard(WS, id), json!({"results": {"id": id.parse::<u32>().unwrap()}}));
            transport.on(Method::DELETE, e.dashboard(WS, id), json!(null));
        }
        for entity in [LexiconEntity::Events, LexiconEntity::EventProperties, LexiconEntity::UserProperties] {
            transport.on(Method::GET, e.lexicon("1234", WS, entity), json!({"results": []}));
        }
        transport.on(Method::GET, e.cohorts(WS), json!({"results": []}));
        transport.on(Method::GET, e.custom_events(WS), json!({"custom_events": []}));
        transport.on(Method::GET, e.custom_props(WS), json!({"results": []}));
        transport.on(Method::GET, e.formulas("1234"), json!({"results": []}));
        transport.on(Method::GET, e.users("1234"), json!({"results": []}));
        let mut project = project(&transport);

        let deleted = project.delete_all().await.unwrap();

        assert_eq!(deleted.dashboards.len(), 2);
        let deletes = transport
            .requests()
            .iter()
            .filter(|r| r.method == Method::DELETE)
            .count();
        assert_eq!(deletes, 2);
    }

    #[tokio::test]
    async fn test_missing_workspace_is_reported() {
        let transport = MockTransport::new();
        let e = endpoints();
        transport.on(Method::GET, e.me(), json!({"results": {}}));
        transport.on(Method::GET, e.project_metadata("1234"), json!({"results": {}}));
        transport.on(Method::GET, e.project_metadata_also("1234"), json!({"results": {"workspaces": {}}}));
        let mut project = project(&transport);

        let err = project.get_cohorts().await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_into_list_shapes() {
        assert_eq!(into_list(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(into_list(json!({"a": 1})), vec![json!(1)]);
        assert!(into_list(Value::Null).is_empty());
    }
}
