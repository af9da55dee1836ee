//! The loader state machine.
//!
//! Steps run strictly in order: locate, resolve, check for a conflict,
//! prepare, apply. [`FactoryLoader::advance`] runs the current step once and
//! can be called again after its future was dropped; the steps keep their
//! progress in [`LoaderState`] so nothing is submitted twice.

mod apply;
mod check_conflict;
mod locate;
mod prepare;
mod resolve;
mod state;
mod step;
mod view;

pub use apply::ApplyStep;
pub use check_conflict::CheckConflictStep;
pub use locate::LocateStep;
pub use prepare::PrepareStep;
pub use resolve::ResolveStep;
pub use state::LoaderState;
pub use step::{LoaderStep, StepContext, StepId, StepOutcome, StepRecord, StepStatus};
pub use view::{Alert, AlertAction, AlertSeverity, StepView};

use factory_messages::{msg, MESSAGES};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::params::SourceParameters;
use crate::services::LoaderServices;
use crate::workspace::{Workspace, WorkspaceRef};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStatus {
    Running,
    /// Waiting for the user to pick a [`ConflictResolution`].
    ConflictPending { existing: Workspace },
    /// The user was sent to the git provider; a new loader takes over when
    /// they come back.
    AwaitingAuthentication { authentication_url: String },
    Failed(LoaderError),
    Succeeded(WorkspaceRef),
    Cancelled,
}

impl PipelineStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, PipelineStatus::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    OpenExisting,
    CreateNew,
}

pub struct FactoryLoader {
    params: SourceParameters,
    services: LoaderServices,
    config: LoaderConfig,
    steps: Vec<Box<dyn LoaderStep>>,
    records: Vec<StepRecord>,
    state: LoaderState,
    status: PipelineStatus,
    cancel: CancellationToken,
}

impl FactoryLoader {
    pub fn new(params: SourceParameters, services: LoaderServices, config: LoaderConfig) -> Self {
        let steps: Vec<Box<dyn LoaderStep>> = vec![
            Box::new(LocateStep),
            Box::new(ResolveStep),
            Box::new(CheckConflictStep),
            Box::new(PrepareStep),
            Box::new(ApplyStep),
        ];
        let records = Self::fresh_records(&steps, &params);
        Self {
            params,
            services,
            config,
            steps,
            records,
            state: LoaderState::default(),
            status: PipelineStatus::Running,
            cancel: CancellationToken::new(),
        }
    }

    /// Parse `query` and build a loader for it.
    pub fn from_query(query: &str, services: LoaderServices, config: LoaderConfig) -> Result<Self> {
        Ok(Self::new(SourceParameters::parse(query)?, services, config))
    }

    fn fresh_records(steps: &[Box<dyn LoaderStep>], params: &SourceParameters) -> Vec<StepRecord> {
        steps
            .iter()
            .map(|step| StepRecord::new(step.id(), step.title(params)))
            .collect()
    }

    /// Run the current step once and return the resulting status.
    ///
    /// Does nothing unless the pipeline is running.
    pub async fn advance(&mut self) -> PipelineStatus {
        if !self.status.is_running() {
            return self.status.clone();
        }
        if self.cancel.is_cancelled() {
            self.status = PipelineStatus::Cancelled;
            return self.status.clone();
        }

        let index = self.state.current_step;
        let Some(step) = self.steps.get(index) else {
            return self.fail(
                index,
                LoaderError::Submission(msg!(MESSAGES.errors.unexpected_creation_failure)),
            );
        };
        let step_id = step.id();
        self.records[index].status = StepStatus::Running;

        let pause = self.config.min_step_duration();
        if !pause.is_zero() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.status = PipelineStatus::Cancelled;
                    return self.status.clone();
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }

        let span = info_span!(
            "step",
            step = step_id.as_str(),
            factory_id = self.params.factory_id()
        );
        let mut ctx = StepContext {
            params: &self.params,
            services: &self.services,
            config: &self.config,
            state: &mut self.state,
            record: &mut self.records[index],
            cancel: &self.cancel,
        };
        let result = step.run(&mut ctx).instrument(span).await;

        match result {
            Ok(StepOutcome::Continue) => {
                debug!(step = %step_id, "Step succeeded");
                self.records[index].status = StepStatus::Succeeded;
                self.state.current_step += 1;
            }
            Ok(StepOutcome::Redirect(workspace)) => {
                self.records[index].status = StepStatus::Succeeded;
                let target = workspace.reference();
                info!(target = %target, "Opening workspace");
                self.services.navigator.open_workspace(&target);
                self.status = PipelineStatus::Succeeded(target);
            }
            Ok(StepOutcome::Conflict(existing)) => {
                self.status = PipelineStatus::ConflictPending { existing };
            }
            Ok(StepOutcome::Authenticate { authentication_url }) => {
                info!(%authentication_url, "Authentication required");
                self.services
                    .navigator
                    .open_authentication(&authentication_url, &self.return_url());
                self.status = PipelineStatus::AwaitingAuthentication { authentication_url };
            }
            Err(LoaderError::Cancelled) => {
                self.records[index].status = StepStatus::Pending;
                self.status = PipelineStatus::Cancelled;
            }
            Err(error) => return self.fail(index, error),
        }
        self.status.clone()
    }

    fn fail(&mut self, index: usize, error: LoaderError) -> PipelineStatus {
        warn!(error = %error, "Workspace creation failed");
        if let Some(record) = self.records.get_mut(index) {
            record.status = StepStatus::Failed;
        }
        self.state.last_error = Some(error.clone());
        self.status = PipelineStatus::Failed(error);
        self.status.clone()
    }

    /// Advance until the pipeline stops running.
    pub async fn run(&mut self) -> PipelineStatus {
        loop {
            let status = self.advance().await;
            if !status.is_running() {
                return status;
            }
        }
    }

    pub fn resolve_conflict(&mut self, resolution: ConflictResolution) {
        let PipelineStatus::ConflictPending { existing } = &self.status else {
            debug!("No conflict to resolve");
            return;
        };
        let index = self.state.current_step;
        match resolution {
            ConflictResolution::OpenExisting => {
                let target = existing.reference();
                info!(target = %target, "Opening the existing workspace");
                self.services.navigator.open_workspace(&target);
                self.state.should_create = false;
                self.records[index].status = StepStatus::Succeeded;
                self.status = PipelineStatus::Succeeded(target);
            }
            ConflictResolution::CreateNew => {
                info!("Creating a new workspace next to the existing one");
                self.state.append_suffix = true;
                self.status = PipelineStatus::Running;
            }
        }
    }

    /// Start over from the first step with a fresh state.
    pub fn restart(&mut self) {
        if self.status == PipelineStatus::Cancelled {
            return;
        }
        info!("Restarting the loader");
        self.state = LoaderState::default();
        self.records = Self::fresh_records(&self.steps, &self.params);
        self.status = PipelineStatus::Running;
    }

    /// Retry resolution with a devfile derived from the source URL.
    pub fn continue_with_default_devfile(&mut self) {
        match &self.status {
            PipelineStatus::Failed(error) if error.offers_default_devfile() => {}
            _ => {
                debug!("The default devfile is not offered");
                return;
            }
        }
        let index = self.state.current_step;
        self.records[index].status = StepStatus::Pending;
        self.state.last_error = None;
        self.state.use_default_devfile = true;
        self.status = PipelineStatus::Running;
    }

    /// Cancel every wait. The loader stays cancelled.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
        self.status = PipelineStatus::Cancelled;
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn params(&self) -> &SourceParameters {
        &self.params
    }

    pub fn steps(&self) -> Vec<StepView> {
        self.records
            .iter()
            .map(|record| StepView {
                id: record.id,
                title: record.title.clone(),
                status: record.status,
                has_error: record.status == StepStatus::Failed,
                has_warning: record.has_warning,
            })
            .collect()
    }

    /// The single alert to show, if any.
    pub fn alert(&self) -> Option<Alert> {
        match &self.status {
            PipelineStatus::Failed(error) => Some(Alert::for_error(error)),
            PipelineStatus::ConflictPending { existing } => Some(Alert::for_conflict(existing)),
            PipelineStatus::Succeeded(_) => self.state.warning.as_deref().map(Alert::for_warning),
            _ => None,
        }
    }

    /// Loader route with the original parameters, for the OAuth provider to
    /// send the user back to.
    fn return_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.params())
            .finish();
        format!("{}?{}", self.config.auth_return_path, query)
    }
}

impl Drop for FactoryLoader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
