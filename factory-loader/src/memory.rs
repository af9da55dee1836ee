//! In-memory collaborators.
//!
//! Used by `factory-loader simulate` and by the tests. The creator can
//! materialize submitted workspaces into the store, which stands in for the
//! controller picking up the request.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use crate::devfile::{Devfile, DEVWORKSPACE_METADATA_ANNOTATION};
use crate::prepare::PreparedResource;
use crate::resources::ResourcePair;
use crate::services::{
    AuthAttempts, CreateParams, DevfileResolution, Navigator, ResolveFailure, SourceResolver,
    WorkspaceCreator, WorkspaceStore,
};
use crate::workspace::{Workspace, WorkspacePhase, WorkspaceRef};

pub const DEFAULT_NAMESPACE: &str = "user-che";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct InMemoryWorkspaceStore {
    workspaces: Mutex<Vec<Workspace>>,
    warnings: Mutex<HashMap<String, String>>,
}

impl InMemoryWorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workspaces(workspaces: Vec<Workspace>) -> Self {
        Self {
            workspaces: Mutex::new(workspaces),
            ..Default::default()
        }
    }

    pub fn insert(&self, workspace: Workspace) {
        lock(&self.workspaces).push(workspace);
    }

    pub fn set_warning(&self, uid: &str, warning: &str) {
        lock(&self.warnings).insert(uid.to_string(), warning.to_string());
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        lock(&self.workspaces).clone()
    }
}

#[async_trait]
impl WorkspaceStore for InMemoryWorkspaceStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Workspace>> {
        Ok(self.workspaces())
    }

    async fn warning(&self, uid: &str) -> Option<String> {
        lock(&self.warnings).get(uid).cloned()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAuthAttempts {
    counts: Mutex<HashMap<String, u32>>,
}

impl InMemoryAuthAttempts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthAttempts for InMemoryAuthAttempts {
    fn count(&self, source_url: &str) -> u32 {
        lock(&self.counts).get(source_url).copied().unwrap_or(0)
    }

    fn increment(&self, source_url: &str) {
        *lock(&self.counts).entry(source_url.to_string()).or_insert(0) += 1;
    }

    fn clear(&self, source_url: &str) {
        lock(&self.counts).remove(source_url);
    }
}

/// Resolver serving fixed documents whatever the URL.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    devfile: Option<Devfile>,
    resources: Option<ResourcePair>,
}

impl StaticResolver {
    pub fn devfile(devfile: Devfile) -> Self {
        Self {
            devfile: Some(devfile),
            resources: None,
        }
    }

    pub fn resources(resources: ResourcePair) -> Self {
        Self {
            devfile: None,
            resources: Some(resources),
        }
    }
}

#[async_trait]
impl SourceResolver for StaticResolver {
    async fn resolve_devfile(
        &self,
        url: &str,
        overrides: &IndexMap<String, String>,
    ) -> Result<DevfileResolution, ResolveFailure> {
        let mut devfile = self
            .devfile
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No devfile available for {url}"))?;
        if let Some(name) = overrides.get("metadata.name") {
            devfile.metadata.name = Some(name.clone());
            devfile.metadata.generate_name = None;
        }
        Ok(DevfileResolution::Resolved(devfile))
    }

    async fn fetch_resources(&self, url: &str) -> Result<ResourcePair, ResolveFailure> {
        self.resources
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No resources available at {url}").into())
    }
}

/// Creator that records every submission and, unless deferred, makes the
/// workspace appear in the store right away.
pub struct MaterializingCreator {
    store: Arc<InMemoryWorkspaceStore>,
    materialize: bool,
    submissions: Mutex<Vec<PreparedResource>>,
}

impl MaterializingCreator {
    pub fn new(store: Arc<InMemoryWorkspaceStore>) -> Self {
        Self {
            store,
            materialize: true,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Record submissions only; the caller adds workspaces to the store.
    pub fn deferred(store: Arc<InMemoryWorkspaceStore>) -> Self {
        Self {
            materialize: false,
            ..Self::new(store)
        }
    }

    pub fn submissions(&self) -> Vec<PreparedResource> {
        lock(&self.submissions).clone()
    }

    pub fn submission_count(&self) -> usize {
        lock(&self.submissions).len()
    }

    fn record(
        &self,
        resource: PreparedResource,
        namespace: Option<&str>,
        annotations: BTreeMap<String, String>,
        params: &CreateParams,
    ) -> anyhow::Result<()> {
        let name = resource
            .name()
            .ok_or_else(|| anyhow::anyhow!("The workspace has no name"))?
            .to_string();
        lock(&self.submissions).push(resource);
        if !self.materialize {
            return Ok(());
        }

        let namespace = params
            .namespace
            .as_deref()
            .or(namespace)
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string();
        debug!(%namespace, %name, "Materializing workspace");
        self.store.insert(Workspace {
            uid: Uuid::new_v4().to_string(),
            name,
            namespace,
            phase: WorkspacePhase::Starting,
            annotations,
        });
        Ok(())
    }
}

#[async_trait]
impl WorkspaceCreator for MaterializingCreator {
    async fn create_from_devfile(
        &self,
        devfile: &Devfile,
        params: &CreateParams,
    ) -> anyhow::Result<()> {
        // The platform turns this attribute into DevWorkspace annotations.
        let annotations = devfile
            .workspace_attributes()
            .and_then(|attributes| attributes.get(DEVWORKSPACE_METADATA_ANNOTATION))
            .and_then(Value::as_object)
            .map(|annotations| {
                annotations
                    .iter()
                    .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        self.record(
            PreparedResource::Devfile(devfile.clone()),
            None,
            annotations,
            params,
        )
    }

    async fn create_from_resources(
        &self,
        resources: &ResourcePair,
        params: &CreateParams,
    ) -> anyhow::Result<()> {
        let metadata = &resources.workspace.metadata;
        self.record(
            PreparedResource::Resources(resources.clone()),
            metadata.namespace.as_deref(),
            metadata.annotations.clone().unwrap_or_default(),
            params,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Workspace(WorkspaceRef),
    Authentication {
        authentication_url: String,
        return_url: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Navigation> {
        lock(&self.events).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open_workspace(&self, target: &WorkspaceRef) {
        lock(&self.events).push(Navigation::Workspace(target.clone()));
    }

    fn open_authentication(&self, authentication_url: &str, return_url: &str) {
        lock(&self.events).push(Navigation::Authentication {
            authentication_url: authentication_url.to_string(),
            return_url: return_url.to_string(),
        });
    }
}
