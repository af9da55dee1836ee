use async_trait::async_trait;
use factory_messages::{msg, MESSAGES};
use tracing::info;

use super::step::{LoaderStep, StepContext, StepId, StepOutcome};
use crate::error::Result;
use crate::locator::locate;
use crate::params::SourceParameters;

/// Reopens the workspace a `peruser` factory link already produced.
pub struct LocateStep;

#[async_trait]
impl LoaderStep for LocateStep {
    fn id(&self) -> StepId {
        StepId::Locate
    }

    fn title(&self, _params: &SourceParameters) -> String {
        msg!(MESSAGES.steps.locate)
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let workspaces = ctx.list_workspaces().await?;
        let found = locate(
            &workspaces,
            ctx.params.factory_id(),
            ctx.params.policy(),
            None,
        );
        match found {
            Some(existing) => {
                info!(workspace = %existing.name, "Reusing workspace created from this factory");
                ctx.state.should_create = false;
                Ok(StepOutcome::Redirect(existing.clone()))
            }
            None => Ok(StepOutcome::Continue),
        }
    }
}
