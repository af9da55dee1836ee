//! Workspace creation from factory links.
//!
//! A factory link points at a devfile (or a pre-built DevWorkspace bundle).
//! [`FactoryLoader`] turns it into a running workspace: it looks for a
//! workspace the link already produced, resolves the source, checks for
//! conflicts, prepares the resource and submits it exactly once, then waits
//! for the workspace to appear.
//!
//! Everything outside the process is reached through the traits in
//! [`services`]; [`memory`] has in-memory implementations.

pub mod config;
pub mod devfile;
pub mod error;
pub mod locator;
pub mod memory;
pub mod naming;
pub mod params;
pub mod pipeline;
pub mod prepare;
pub mod provenance;
pub mod resources;
pub mod services;
pub mod workspace;

pub use config::LoaderConfig;
pub use devfile::Devfile;
pub use error::{ErrorKind, LoaderError, Result};
pub use params::{CreatePolicy, SourceKind, SourceParameters, StorageType};
pub use pipeline::{
    Alert, AlertAction, AlertSeverity, ConflictResolution, FactoryLoader, PipelineStatus,
    StepId, StepStatus, StepView,
};
pub use prepare::{PreparedResource, RawSource, ResourcePreparer};
pub use resources::ResourcePair;
pub use services::LoaderServices;
pub use workspace::{Workspace, WorkspacePhase, WorkspaceRef};
