//! SDK-specific types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// A set of HTTP headers, name -> value.
pub type Headers = BTreeMap<String, String>;

/// Data residency region of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    /// Subdomain prefix for region-qualified hosts.
    pub fn subdomain(&self) -> &'static str {
        match self {
            Self::Us => "",
            Self::Eu => "eu.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Eu => "EU",
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::Us),
            "EU" => Ok(Self::Eu),
            _ => Err(Error::InvalidRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which derived authorization header set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    /// `Basic` credential from the service account id/secret pair.
    ServiceAccount,
    /// `Bearer` credential from the access token.
    AccessToken,
}

impl HeaderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceAccount => "service_acct",
            Self::AccessToken => "access_token",
        }
    }
}

/// Order in which derived header sets are tried when no kind is requested.
pub const HEADER_PRECEDENCE: [HeaderKind; 2] = [HeaderKind::ServiceAccount, HeaderKind::AccessToken];

/// Category of project asset held in the asset cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Schema,
    Dashboards,
    Reports,
    Cohorts,
    CustomEvents,
    CustomProps,
    Formulas,
    Users,
}

impl AssetKind {
    pub const ALL: [AssetKind; 8] = [
        Self::Schema,
        Self::Dashboards,
        Self::Reports,
        Self::Cohorts,
        Self::CustomEvents,
        Self::CustomProps,
        Self::Formulas,
        Self::Users,
    ];
}

/// Options for creating a Project.
///
/// Everything is optional; the handshake validates what it needs.
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Display name
    pub name: Option<String>,
    /// Local directory for exported files
    pub write_path: Option<PathBuf>,
    /// Project id
    pub project_id: Option<String>,
    /// Region code, `US` or `EU` (case-insensitive)
    pub region: Option<String>,
    /// Project token
    pub token: Option<String>,
    /// Project API secret
    pub api_secret: Option<String>,
    /// Bearer access token
    pub access_token: Option<String>,
    /// Service account username
    pub service_acct: Option<String>,
    /// Service account secret
    pub service_secret: Option<String>,
    /// Pre-computed headers that bypass derivation entirely
    pub headers: Option<Headers>,
    /// Organization id, if already known
    pub org_id: Option<String>,
    /// Workspace id, if already known
    pub workspace_id: Option<String>,
    /// Scheme + host override (e.g. a local fake server)
    pub api_host: Option<String>,
    /// Concurrency for bulk child fetches
    pub batch_size: Option<usize>,
}

impl ProjectOptions {
    /// Fill every unset id, credential and host field from `MP_*`
    /// environment variables.
    pub fn with_env_fallback(mut self) -> Self {
        fn env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        }

        self.project_id = self.project_id.or_else(|| env("MP_PROJECT_ID"));
        self.region = self.region.or_else(|| env("MP_REGION"));
        self.access_token = self.access_token.or_else(|| env("MP_ACCESS_TOKEN"));
        self.service_acct = self.service_acct.or_else(|| env("MP_SERVICE_ACCT"));
        self.service_secret = self.service_secret.or_else(|| env("MP_SERVICE_SECRET"));
        self.token = self.token.or_else(|| env("MP_TOKEN"));
        self.api_secret = self.api_secret.or_else(|| env("MP_API_SECRET"));
        self.api_host = self.api_host.or_else(|| env("MP_API_HOST"));
        self
    }
}

/// Metadata gathered by the handshake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// The authenticated user, as returned by the identity endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// Project metadata merged from both metadata endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Map<String, Value>>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.project.is_none()
    }
}

/// Everything `get_all` gathered.
#[derive(Debug, Clone, Serialize)]
pub struct AllAssets {
    pub schema: Value,
    pub dashboards: Vec<Value>,
    pub cohorts: Vec<Value>,
    pub custom_events: Vec<Value>,
    pub custom_props: Vec<Value>,
    pub formulas: Vec<Value>,
    pub users: Vec<Value>,
}

/// Responses of the deletes issued by `delete_all`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletedAssets {
    pub dashboards: Vec<Value>,
}

/// Responses of the four calls that make up dashboard creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedDashboard {
    pub create: Value,
    pub edit: Value,
    pub share: Value,
    pub pin: Value,
}
