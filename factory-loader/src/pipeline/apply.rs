use async_trait::async_trait;
use factory_messages::{msg, MESSAGES};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::step::{LoaderStep, StepContext, StepId, StepOutcome};
use crate::error::{LoaderError, Result};
use crate::locator::locate_named;
use crate::params::SourceParameters;
use crate::prepare::PreparedResource;
use crate::services::CreateParams;
use crate::workspace::Workspace;

/// Submits the prepared resource once and waits for the workspace to show up.
pub struct ApplyStep;

impl ApplyStep {
    /// Send the creation request. The call shares the creation deadline.
    async fn submit(&self, ctx: &StepContext<'_>, deadline: Instant) -> Result<()> {
        let prepared = ctx.state.prepared.as_ref().ok_or_else(|| {
            LoaderError::Submission(msg!(MESSAGES.errors.unexpected_creation_failure))
        })?;
        let params = CreateParams {
            namespace: ctx.config.namespace.clone(),
            editor_id: ctx.params.editor_id().map(str::to_string),
            params: ctx.params.params().clone(),
        };

        let creator = &ctx.services.creator;
        let submission = match prepared {
            PreparedResource::Devfile(devfile) => creator.create_from_devfile(devfile, &params),
            PreparedResource::Resources(resources) => {
                creator.create_from_resources(resources, &params)
            }
        };
        match ctx.until_deadline(deadline, submission).await? {
            Some(result) => result.map_err(|e| LoaderError::Submission(format!("{e:#}"))),
            None => Err(LoaderError::CreationTimeout {
                timeout_secs: ctx.config.create_timeout_secs,
            }),
        }
    }

    fn find_created<'w>(
        &self,
        ctx: &StepContext<'_>,
        workspaces: &'w [Workspace],
        name: &str,
    ) -> Option<&'w Workspace> {
        locate_named(
            workspaces,
            ctx.config.namespace.as_deref(),
            ctx.params.factory_id(),
            name,
        )
    }

    /// Poll the store until `name` appears or `deadline` passes.
    async fn await_ready(
        &self,
        ctx: &StepContext<'_>,
        name: &str,
        deadline: Instant,
    ) -> Result<Workspace> {
        loop {
            match ctx.services.store.list_all().await {
                Ok(workspaces) => {
                    if let Some(workspace) = self.find_created(ctx, &workspaces, name) {
                        return Ok(workspace.clone());
                    }
                }
                Err(e) => warn!("Failed to read workspaces while waiting: {:#}", e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(LoaderError::CreationTimeout {
                    timeout_secs: ctx.config.create_timeout_secs,
                });
            }
            let wake = (now + ctx.config.poll_interval()).min(deadline);
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => return Err(LoaderError::Cancelled),
                _ = sleep_until(wake) => {}
            }
        }
    }

    async fn ready(&self, ctx: &mut StepContext<'_>, workspace: Workspace) -> StepOutcome {
        if let Some(warning) = ctx.services.store.warning(&workspace.uid).await {
            warn!(workspace = %workspace.name, %warning, "Workspace has a warning");
            ctx.record.title = msg!(MESSAGES.steps.warning, warning = warning.as_str());
            ctx.record.has_warning = true;
            ctx.state.warning = Some(warning);
        }
        StepOutcome::Redirect(workspace)
    }
}

#[async_trait]
impl LoaderStep for ApplyStep {
    fn id(&self) -> StepId {
        StepId::Apply
    }

    fn title(&self, _params: &SourceParameters) -> String {
        msg!(MESSAGES.steps.apply)
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let name = ctx.state.resolved_name.clone().ok_or_else(|| {
            LoaderError::Submission(msg!(MESSAGES.errors.unexpected_creation_failure))
        })?;

        let workspaces = ctx.list_workspaces().await?;
        if let Some(existing) = self.find_created(ctx, &workspaces, &name) {
            debug!(workspace = %name, "Workspace already exists");
            ctx.state.should_create = false;
            return Ok(self.ready(ctx, existing.clone()).await);
        }

        let timeout = ctx.config.create_timeout();
        let deadline = *ctx
            .state
            .create_deadline
            .get_or_insert_with(|| Instant::now() + timeout);

        if ctx.state.should_create {
            ctx.state.should_create = false;
            info!(workspace = %name, "Submitting workspace");
            self.submit(ctx, deadline).await?;
        }

        let workspace = self.await_ready(ctx, &name, deadline).await?;
        info!(workspace = %name, namespace = %workspace.namespace, "Workspace is ready");
        Ok(self.ready(ctx, workspace).await)
    }
}
