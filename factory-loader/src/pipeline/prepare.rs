use async_trait::async_trait;
use factory_messages::{msg, MESSAGES};
use tracing::{debug, info};

use super::step::{LoaderStep, StepContext, StepId, StepOutcome};
use crate::error::{LoaderError, Result};
use crate::locator::{has_name_conflict, locate_named};
use crate::params::{CreatePolicy, SourceParameters};
use crate::prepare::ResourcePreparer;

pub struct PrepareStep;

#[async_trait]
impl LoaderStep for PrepareStep {
    fn id(&self) -> StepId {
        StepId::Prepare
    }

    fn title(&self, _params: &SourceParameters) -> String {
        msg!(MESSAGES.steps.prepare)
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        if ctx.state.prepared.is_some() {
            return Ok(StepOutcome::Continue);
        }

        let workspaces = ctx.list_workspaces().await?;
        let source = ctx.source()?;
        let name_taken = source
            .candidate_name()
            .is_some_and(|name| has_name_conflict(&workspaces, name));
        if name_taken {
            debug!("Workspace name already taken");
        }
        let append_suffix = ctx.state.append_suffix
            || ctx.params.policy() == CreatePolicy::PerClick
            || name_taken;

        let prepared = ResourcePreparer::new(ctx.services.suffixes.as_ref()).prepare(
            source,
            ctx.params.factory_id(),
            ctx.params.storage_type(),
            append_suffix,
        )?;
        let name = prepared
            .name()
            .map(str::to_string)
            .ok_or_else(|| LoaderError::Resolution("The workspace has no name".into()))?;
        info!(workspace = %name, append_suffix, "Prepared workspace");

        let namespace = ctx.config.namespace.as_deref();
        if locate_named(&workspaces, namespace, ctx.params.factory_id(), &name).is_some() {
            ctx.state.should_create = false;
        }
        ctx.state.resolved_name = Some(name);
        ctx.state.prepared = Some(prepared);
        Ok(StepOutcome::Continue)
    }
}
