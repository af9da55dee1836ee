use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::state::LoaderState;
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::params::SourceParameters;
use crate::prepare::RawSource;
use crate::services::LoaderServices;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    Locate,
    Resolve,
    CheckConflict,
    Prepare,
    Apply,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Locate => "locate",
            StepId::Resolve => "resolve",
            StepId::CheckConflict => "check-conflict",
            StepId::Prepare => "prepare",
            StepId::Apply => "apply",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Display state of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub id: StepId,
    pub title: String,
    pub status: StepStatus,
    pub has_warning: bool,
}

impl StepRecord {
    pub fn new(id: StepId, title: String) -> Self {
        Self {
            id,
            title,
            status: StepStatus::Pending,
            has_warning: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Move on to the next step.
    Continue,
    /// The target workspace exists; the pipeline is done.
    Redirect(Workspace),
    /// A matching workspace exists and the user has to choose.
    Conflict(Workspace),
    /// The user must authenticate with the git provider first.
    Authenticate { authentication_url: String },
}

/// What a step gets to work with. Only the controller builds one.
pub struct StepContext<'a> {
    pub params: &'a SourceParameters,
    pub services: &'a LoaderServices,
    pub config: &'a LoaderConfig,
    pub state: &'a mut LoaderState,
    pub record: &'a mut StepRecord,
    pub cancel: &'a CancellationToken,
}

impl StepContext<'_> {
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LoaderError::Cancelled),
            result = self.services.store.list_all() => {
                result.map_err(|e| LoaderError::WorkspaceStore(format!("{e:#}")))
            }
        }
    }

    /// Run `future` until `deadline`. `Ok(None)` means the deadline passed.
    pub async fn until_deadline<F>(&self, deadline: Instant, future: F) -> Result<Option<F::Output>>
    where
        F: Future + Send,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LoaderError::Cancelled),
            output = future => Ok(Some(output)),
            _ = sleep_until(deadline) => Ok(None),
        }
    }

    pub async fn pause(&self, duration: Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LoaderError::Cancelled),
            _ = sleep(duration) => Ok(()),
        }
    }

    pub fn source(&self) -> Result<&RawSource> {
        self.state
            .source
            .as_ref()
            .ok_or_else(|| LoaderError::Resolution("The source has not been resolved".into()))
    }
}

/// One stage of the loader.
///
/// `run` may be invoked again after its future was dropped, so everything it
/// does must be safe to repeat; progress is kept in [`LoaderState`].
#[async_trait]
pub trait LoaderStep: Send + Sync {
    fn id(&self) -> StepId;

    fn title(&self, params: &SourceParameters) -> String;

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome>;
}
