//! Endpoint table for the web-application API.

use crate::sdk::types::Region;

/// Default API host.
pub const DEFAULT_HOST: &str = "mixpanel.com";

/// Region-qualified URL builder.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    /// Endpoints on the public host, `eu.`-prefixed for EU projects.
    pub fn new(region: Region) -> Self {
        Self {
            base: format!("https://{}{}", region.subdomain(), DEFAULT_HOST),
        }
    }

    /// Endpoints on an explicit scheme + host; no region prefix is applied.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    // ===== Handshake =====

    pub fn me(&self) -> String {
        format!("{}/api/app/me?include_workspace_users=false", self.base)
    }

    pub fn project_metadata(&self, project_id: &str) -> String {
        format!("{}/settings/project/{}/metadata", self.base, project_id)
    }

    pub fn project_metadata_also(&self, project_id: &str) -> String {
        format!("{}/api/app/projects/{}/metadata", self.base, project_id)
    }

    // ===== Workspace assets =====

    pub fn dashboards(&self, workspace_id: &str) -> String {
        format!("{}/api/app/workspaces/{}/dashboards/", self.base, workspace_id)
    }

    pub fn dashboard(&self, workspace_id: &str, dash_id: &str) -> String {
        format!(
            "{}/api/app/workspaces/{}/dashboards/{}",
            self.base, workspace_id, dash_id
        )
    }

    pub fn pin_dashboard(&self, workspace_id: &str, dash_id: &str) -> String {
        format!("{}/pin/", self.dashboard(workspace_id, dash_id))
    }

    pub fn share_dashboard(&self, project_id: &str, dash_id: &str) -> String {
        format!(
            "{}/api/app/projects/{}/shared-entities/dashboards/{}/upsert",
            self.base, project_id, dash_id
        )
    }

    pub fn report(&self, workspace_id: &str, report_id: &str) -> String {
        format!(
            "{}/api/app/workspaces/{}/bookmarks/{}?v=2",
            self.base, workspace_id, report_id
        )
    }

    pub fn cohorts(&self, workspace_id: &str) -> String {
        format!("{}/api/app/workspaces/{}/cohorts/", self.base, workspace_id)
    }

    pub fn custom_events(&self, workspace_id: &str) -> String {
        format!("{}/api/app/workspaces/{}/custom_events", self.base, workspace_id)
    }

    pub fn custom_props(&self, workspace_id: &str) -> String {
        format!(
            "{}/api/app/workspaces/{}/custom_properties",
            self.base, workspace_id
        )
    }

    // ===== Project assets =====

    pub fn formulas(&self, project_id: &str) -> String {
        format!("{}/api/app/projects/{}/metrics", self.base, project_id)
    }

    pub fn users(&self, project_id: &str) -> String {
        format!(
            "{}/api/app/projects/{}/granted-users?include_invited_users=true&include_access_requests=true",
            self.base, project_id
        )
    }

    pub fn themes(&self, project_id: &str) -> String {
        format!("{}/api/app/projects/{}/themes", self.base, project_id)
    }

    /// Lexicon (data definitions) for one entity type.
    pub fn lexicon(&self, project_id: &str, workspace_id: &str, entity: LexiconEntity) -> String {
        match entity {
            LexiconEntity::Events => format!(
                "{}/api/query/data_definitions/events?project_id={}&workspace_id={}",
                self.base, project_id, workspace_id
            ),
            LexiconEntity::EventProperties => format!(
                "{}/api/query/data_definitions/properties?includeCustom=false&project_id={}&resourceType=Event&workspace_id={}",
                self.base, project_id, workspace_id
            ),
            LexiconEntity::UserProperties => format!(
                "{}/api/query/data_definitions/properties?includeCustom=false&project_id={}&workspace_id={}&resourceType=User",
                self.base, project_id, workspace_id
            ),
        }
    }
}

/// Lexicon entity types read when assembling a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexiconEntity {
    Events,
    EventProperties,
    UserProperties,
}
