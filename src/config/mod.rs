//! Configuration management for the project client.

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sdk::gateway::DEFAULT_BATCH_SIZE;
use crate::sdk::types::{AssetKind, ProjectOptions};

/// Command-line arguments for the `mp-project` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "mp-project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Authenticate against an analytics project and dump its metadata as JSON")]
pub struct Args {
    /// Project id
    #[arg(short, long, env = "MP_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Data residency region: US or EU
    #[arg(short, long, default_value = "US", env = "MP_REGION")]
    pub region: String,

    /// Bearer access token
    #[arg(long, env = "MP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Service account username
    #[arg(long, env = "MP_SERVICE_ACCT")]
    pub service_acct: Option<String>,

    /// Service account secret
    #[arg(long, env = "MP_SERVICE_SECRET", hide_env_values = true)]
    pub service_secret: Option<String>,

    /// Scheme + host override (default: region-qualified public host)
    #[arg(long, env = "MP_API_HOST")]
    pub api_host: Option<String>,

    /// Concurrent requests per batch for bulk fetches
    #[arg(long, default_value = "10", env = "MP_BATCH_SIZE")]
    pub batch_size: usize,

    /// Asset kind to fetch after authenticating (default: print metadata)
    #[arg(short, long, value_enum)]
    pub fetch: Option<AssetKind>,

    /// Enable debug logging
    #[arg(short, long, env = "MP_DEBUG")]
    pub debug: bool,
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project id
    pub project_id: Option<String>,
    /// Region code
    pub region: String,
    /// Access token
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    /// Service account username
    pub service_acct: Option<String>,
    /// Service account secret
    #[serde(default, skip_serializing)]
    pub service_secret: Option<String>,
    /// Host override
    pub api_host: Option<String>,
    /// Batch size
    pub batch_size: usize,
    /// Asset kind to fetch
    pub fetch: Option<AssetKind>,
    /// Debug mode
    pub debug: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            project_id: args.project_id,
            region: args.region,
            access_token: args.access_token,
            service_acct: args.service_acct,
            service_secret: args.service_secret,
            api_host: args.api_host,
            batch_size: args.batch_size,
            fetch: args.fetch,
            debug: args.debug,
        }
    }
}

impl Config {
    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        if let Some(host) = self.api_host.as_deref() {
            if !host.starts_with("http://") && !host.starts_with("https://") {
                return Err(Error::Config(format!(
                    "api_host must start with http:// or https://, got {}",
                    host
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            region: "US".to_string(),
            access_token: None,
            service_acct: None,
            service_secret: None,
            api_host: None,
            batch_size: DEFAULT_BATCH_SIZE,
            fetch: None,
            debug: false,
        }
    }
}

impl From<&Config> for ProjectOptions {
    fn from(config: &Config) -> Self {
        Self {
            project_id: config.project_id.clone(),
            region: Some(config.region.clone()),
            access_token: config.access_token.clone(),
            service_acct: config.service_acct.clone(),
            service_secret: config.service_secret.clone(),
            api_host: config.api_host.clone(),
            batch_size: Some(config.batch_size),
            ..Default::default()
        }
    }
}
