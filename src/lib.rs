//! mp-project - programmatic client for analytics project metadata.
//!
//! Authenticates against a project, discovers its organization and global
//! workspace, and reads or writes dashboards, reports, cohorts, custom
//! events, custom properties, formulas, users, themes and the lexicon schema.
//! Meant for scripting bulk configuration and project-to-project migration.
//!
//! # Architecture
//!
//! 1. **Session** (`sdk::session`) - credentials, header selection, and the
//!    three-call handshake that discovers the workspace id
//! 2. **Gateway** (`sdk::gateway`) - one authenticated, sanitized request per
//!    call, plus batched fan-out for bulk child fetches
//! 3. **Project** (`sdk::project`) - asset operations and the per-kind cache
//!
//! ```rust,ignore
//! use mp_project::{Project, ProjectOptions};
//!
//! let mut project = Project::new(ProjectOptions {
//!     project_id: Some("1234".into()),
//!     access_token: Some(token),
//!     ..Default::default()
//! })?;
//! project.auth().await?;
//! let schema = project.get_schema().await?;
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod sdk;

pub use error::{Error, Result};
pub use sdk::{AssetKind, AssetRequest, Project, ProjectOptions, Region};

/// Client version, sent in the user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
