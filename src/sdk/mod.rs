//! Project SDK.
//!
//! # Architecture
//!
//! - `credentials` - Credential material and header derivation
//! - `endpoints` - Region-qualified URL table
//! - `gateway` - Authenticated request dispatch and batched fan-out
//! - `project` - Public client with the per-kind asset cache
//! - `sanitize` - Deny-list stripping of outbound payloads
//! - `session` - Handshake and header selection
//! - `transport` - HTTP transport seam
//! - `types` - SDK-specific types

pub mod credentials;
pub mod endpoints;
pub mod gateway;
pub mod project;
pub mod sanitize;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::{AuthHeaders, Credentials, ServiceAccount};
pub use endpoints::Endpoints;
pub use gateway::{issue_request, AssetRequest, DEFAULT_BATCH_SIZE};
pub use project::{AssetCache, Project};
pub use session::Session;
pub use transport::{ApiRequest, HttpTransport, Transport};
pub use types::*;
