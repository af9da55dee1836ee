//! Collaborators the loader talks to.
//!
//! Everything that crosses the process boundary (the workspace store, the
//! factory resolver, the creation API, the browser) sits behind one of these
//! traits. Implementations return `anyhow` errors; the pipeline maps them into
//! [`LoaderError`](crate::LoaderError).

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::devfile::Devfile;
use crate::naming::{RandomSuffix, SuffixGenerator};
use crate::resources::ResourcePair;
use crate::workspace::{Workspace, WorkspaceRef};

/// Read-only view of the workspaces the user already has.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Workspace>>;

    /// Non-fatal warning the platform attached to a workspace.
    async fn warning(&self, _uid: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DevfileResolution {
    Resolved(Devfile),
    /// The repository is private and the user has to go through OAuth first.
    AuthRedirectRequired { authentication_url: String },
}

#[derive(Debug, Error)]
pub enum ResolveFailure {
    #[error("{0}")]
    InvalidDevfile(String),
    #[error("{0}")]
    UnsupportedProvider(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve_devfile(
        &self,
        url: &str,
        overrides: &IndexMap<String, String>,
    ) -> Result<DevfileResolution, ResolveFailure>;

    async fn fetch_resources(&self, url: &str) -> Result<ResourcePair, ResolveFailure>;
}

/// Extra data sent along with a creation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateParams {
    pub namespace: Option<String>,
    pub editor_id: Option<String>,
    pub params: BTreeMap<String, String>,
}

/// Fire-and-forget creation API. Success only means the request was accepted;
/// the workspace shows up in the store later.
#[async_trait]
pub trait WorkspaceCreator: Send + Sync {
    async fn create_from_devfile(&self, devfile: &Devfile, params: &CreateParams)
        -> anyhow::Result<()>;

    async fn create_from_resources(
        &self,
        resources: &ResourcePair,
        params: &CreateParams,
    ) -> anyhow::Result<()>;
}

pub trait Navigator: Send + Sync {
    fn open_workspace(&self, target: &WorkspaceRef);

    /// Leave for the OAuth flow; the provider sends the user back to
    /// `return_url`.
    fn open_authentication(&self, authentication_url: &str, return_url: &str);
}

/// Authentication redirects per source URL. Must outlive a single loader,
/// since every redirect starts a new one.
pub trait AuthAttempts: Send + Sync {
    fn count(&self, source_url: &str) -> u32;
    fn increment(&self, source_url: &str);
    fn clear(&self, source_url: &str);
}

#[derive(Clone)]
pub struct LoaderServices {
    pub store: Arc<dyn WorkspaceStore>,
    pub resolver: Arc<dyn SourceResolver>,
    pub creator: Arc<dyn WorkspaceCreator>,
    pub navigator: Arc<dyn Navigator>,
    pub auth_attempts: Arc<dyn AuthAttempts>,
    pub suffixes: Arc<dyn SuffixGenerator>,
}

impl LoaderServices {
    /// Bundle the collaborators, using random suffixes.
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        resolver: Arc<dyn SourceResolver>,
        creator: Arc<dyn WorkspaceCreator>,
        navigator: Arc<dyn Navigator>,
        auth_attempts: Arc<dyn AuthAttempts>,
    ) -> Self {
        Self {
            store,
            resolver,
            creator,
            navigator,
            auth_attempts,
            suffixes: Arc::new(RandomSuffix),
        }
    }

    pub fn with_suffixes(mut self, suffixes: Arc<dyn SuffixGenerator>) -> Self {
        self.suffixes = suffixes;
        self
    }
}
