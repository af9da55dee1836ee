//! Shared fixtures for the loader integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use factory_loader::devfile::DevfileMetadata;
use factory_loader::memory::{
    InMemoryAuthAttempts, InMemoryWorkspaceStore, MaterializingCreator, RecordingNavigator,
    StaticResolver,
};
use factory_loader::naming::FixedSuffix;
use factory_loader::provenance::{merge_factory_params, DEVWORKSPACE_DEVFILE_SOURCE};
use factory_loader::services::{
    CreateParams, DevfileResolution, ResolveFailure, SourceResolver, WorkspaceCreator,
    WorkspaceStore,
};
use factory_loader::{
    Devfile, LoaderConfig, LoaderServices, ResourcePair, Workspace, WorkspacePhase,
};
use indexmap::IndexMap;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SUFFIX: &str = "abcd";

pub fn devfile(name: &str) -> Devfile {
    Devfile {
        schema_version: Some("2.2.0".to_string()),
        metadata: DevfileMetadata {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A workspace stamped by the factory `factory_id`.
pub fn workspace(uid: &str, name: &str, factory_id: Option<&str>) -> Workspace {
    let mut annotations = BTreeMap::new();
    if let Some(factory_id) = factory_id {
        annotations.insert(
            DEVWORKSPACE_DEVFILE_SOURCE.to_string(),
            merge_factory_params(None, factory_id),
        );
    }
    Workspace {
        uid: uid.to_string(),
        name: name.to_string(),
        namespace: "user-che".to_string(),
        phase: WorkspacePhase::Stopped,
        annotations,
    }
}

pub fn config() -> LoaderConfig {
    LoaderConfig {
        resolve_timeout_secs: 20,
        create_timeout_secs: 20,
        min_step_duration_ms: 0,
        poll_interval_ms: 500,
        max_auth_redirects: 2,
        namespace: None,
        auth_return_path: "/f".to_string(),
    }
}

pub struct Harness {
    pub store: Arc<InMemoryWorkspaceStore>,
    pub creator: Arc<MaterializingCreator>,
    pub navigator: Arc<RecordingNavigator>,
    pub auth_attempts: Arc<InMemoryAuthAttempts>,
}

impl Harness {
    /// Submissions show up in the store right away.
    pub fn new(existing: Vec<Workspace>) -> Self {
        let store = Arc::new(InMemoryWorkspaceStore::with_workspaces(existing));
        Self {
            creator: Arc::new(MaterializingCreator::new(store.clone())),
            store,
            navigator: Arc::new(RecordingNavigator::new()),
            auth_attempts: Arc::new(InMemoryAuthAttempts::new()),
        }
    }

    /// Submissions are only recorded; tests add the workspace themselves.
    pub fn deferred(existing: Vec<Workspace>) -> Self {
        let store = Arc::new(InMemoryWorkspaceStore::with_workspaces(existing));
        Self {
            creator: Arc::new(MaterializingCreator::deferred(store.clone())),
            store,
            navigator: Arc::new(RecordingNavigator::new()),
            auth_attempts: Arc::new(InMemoryAuthAttempts::new()),
        }
    }

    pub fn services(&self, resolver: Arc<dyn SourceResolver>) -> LoaderServices {
        self.services_with_store(resolver, self.store.clone())
    }

    pub fn services_with_store(
        &self,
        resolver: Arc<dyn SourceResolver>,
        store: Arc<dyn WorkspaceStore>,
    ) -> LoaderServices {
        LoaderServices::new(
            store,
            resolver,
            self.creator.clone(),
            self.navigator.clone(),
            self.auth_attempts.clone(),
        )
        .with_suffixes(Arc::new(FixedSuffix(SUFFIX.to_string())))
    }

    pub fn devfile_services(&self, devfile: Devfile) -> LoaderServices {
        self.services(Arc::new(StaticResolver::devfile(devfile)))
    }

    pub fn resources_services(&self, resources: ResourcePair) -> LoaderServices {
        self.services(Arc::new(StaticResolver::resources(resources)))
    }
}

/// Answers devfile requests from a queue; the last answer repeats.
pub struct ScriptedResolver {
    answers: Mutex<VecDeque<Answer>>,
    calls: AtomicUsize,
}

#[derive(Clone)]
pub enum Answer {
    Devfile(Devfile),
    Authenticate(String),
    InvalidDevfile(String),
    UnsupportedProvider(String),
    Error(String),
}

impl ScriptedResolver {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceResolver for ScriptedResolver {
    async fn resolve_devfile(
        &self,
        _url: &str,
        _overrides: &IndexMap<String, String>,
    ) -> Result<DevfileResolution, ResolveFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = {
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop_front()
            } else {
                answers.front().cloned()
            }
        };
        match answer.expect("no scripted answer") {
            Answer::Devfile(devfile) => Ok(DevfileResolution::Resolved(devfile)),
            Answer::Authenticate(url) => Ok(DevfileResolution::AuthRedirectRequired {
                authentication_url: url,
            }),
            Answer::InvalidDevfile(message) => Err(ResolveFailure::InvalidDevfile(message)),
            Answer::UnsupportedProvider(message) => {
                Err(ResolveFailure::UnsupportedProvider(message))
            }
            Answer::Error(message) => Err(ResolveFailure::Other(anyhow::anyhow!(message))),
        }
    }

    async fn fetch_resources(&self, url: &str) -> Result<ResourcePair, ResolveFailure> {
        Err(anyhow::anyhow!("no resources at {url}").into())
    }
}

/// Never answers.
pub struct PendingResolver;

#[async_trait]
impl SourceResolver for PendingResolver {
    async fn resolve_devfile(
        &self,
        _url: &str,
        _overrides: &IndexMap<String, String>,
    ) -> Result<DevfileResolution, ResolveFailure> {
        std::future::pending().await
    }

    async fn fetch_resources(&self, _url: &str) -> Result<ResourcePair, ResolveFailure> {
        std::future::pending().await
    }
}

/// Accepts creation requests and never answers.
pub struct PendingCreator;

#[async_trait]
impl WorkspaceCreator for PendingCreator {
    async fn create_from_devfile(
        &self,
        _devfile: &Devfile,
        _params: &CreateParams,
    ) -> anyhow::Result<()> {
        std::future::pending().await
    }

    async fn create_from_resources(
        &self,
        _resources: &ResourcePair,
        _params: &CreateParams,
    ) -> anyhow::Result<()> {
        std::future::pending().await
    }
}

pub struct UnavailableStore;

#[async_trait]
impl WorkspaceStore for UnavailableStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Workspace>> {
        anyhow::bail!("connection refused")
    }
}
