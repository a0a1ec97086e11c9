//! Credential material and authorization header derivation.
//!
//! A project can be reached with either credential mode, or both:
//! 1. Service account (id + secret) -> `Authorization: Basic base64(id:secret)`
//! 2. Access token -> `Authorization: Bearer <token>`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};
use crate::sdk::types::{Headers, ProjectOptions, Region};

/// Service account username/secret pair.
#[derive(Clone)]
pub struct ServiceAccount {
    pub username: String,
    pub secret: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("username", &self.username)
            .field("secret", &REDACTED)
            .finish()
    }
}

const REDACTED: &str = "<redacted>";

/// Debug stand-in for an optional secret.
fn redact<T>(value: &Option<T>) -> Option<&'static str> {
    value.as_ref().map(|_| REDACTED)
}

/// Header names only; values carry credentials.
fn header_names(headers: &Option<Headers>) -> Option<Vec<&str>> {
    headers
        .as_ref()
        .map(|h| h.keys().map(String::as_str).collect())
}

/// Immutable identity inputs of a session.
#[derive(Clone, Default)]
pub struct Credentials {
    pub project_id: Option<String>,
    pub region: Region,
    pub access_token: Option<String>,
    /// Only populated when both id and secret were supplied
    pub service_account: Option<ServiceAccount>,
    /// Manually supplied headers; always win over derived ones
    pub header_override: Option<Headers>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("access_token", &redact(&self.access_token))
            .field("service_account", &self.service_account)
            .field("header_override", &header_names(&self.header_override))
            .finish()
    }
}

impl Credentials {
    /// Build credentials from construction options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] for a region other than `US`/`EU`.
    pub fn from_options(options: &ProjectOptions) -> Result<Self> {
        let region = match options.region.as_deref() {
            Some(r) if !r.trim().is_empty() => r.parse()?,
            _ => Region::default(),
        };

        let service_account = match (&options.service_acct, &options.service_secret) {
            (Some(username), Some(secret)) if !username.is_empty() && !secret.is_empty() => {
                Some(ServiceAccount {
                    username: username.clone(),
                    secret: secret.clone(),
                })
            }
            _ => None,
        };

        Ok(Self {
            project_id: options.project_id.clone().filter(|id| !id.is_empty()),
            region,
            access_token: options.access_token.clone().filter(|t| !t.is_empty()),
            service_account,
            header_override: options.headers.clone(),
        })
    }

    /// Whether at least one credential mode is usable.
    pub fn has_auth(&self) -> bool {
        self.access_token.is_some() || self.service_account.is_some()
    }

    /// Check the handshake preconditions, in order.
    pub fn validate(&self) -> Result<&str> {
        if !self.has_auth() {
            return Err(Error::MissingCredentials);
        }
        self.project_id.as_deref().ok_or(Error::MissingProjectId)
    }
}

/// The two independently cached authorization header sets.
#[derive(Clone, Default, PartialEq)]
pub struct AuthHeaders {
    pub service_account: Option<Headers>,
    pub access_token: Option<Headers>,
}

impl std::fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("service_account", &header_names(&self.service_account))
            .field("access_token", &header_names(&self.access_token))
            .finish()
    }
}

impl AuthHeaders {
    /// Derive header sets from credentials. Pure, no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAuthValue`] if neither set could be computed.
    pub fn derive(credentials: &Credentials) -> Result<Self> {
        let service_account = credentials
            .service_account
            .as_ref()
            .map(|sa| authorization(basic_auth_value(&sa.username, &sa.secret)));
        let access_token = credentials
            .access_token
            .as_deref()
            .map(|token| authorization(format!("Bearer {}", token)));

        if service_account.is_none() && access_token.is_none() {
            return Err(Error::MissingAuthValue);
        }

        Ok(Self {
            service_account,
            access_token,
        })
    }
}

/// `Basic` authorization value for a username/secret pair.
pub fn basic_auth_value(username: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, secret)))
}

fn authorization(value: String) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), value);
    headers
}
