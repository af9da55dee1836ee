use async_trait::async_trait;
use factory_messages::{msg, MESSAGES};
use tracing::info;

use super::step::{LoaderStep, StepContext, StepId, StepOutcome};
use crate::error::Result;
use crate::locator::locate;
use crate::params::SourceParameters;

/// Pauses when the resolved source matches a workspace the user already has.
pub struct CheckConflictStep;

#[async_trait]
impl LoaderStep for CheckConflictStep {
    fn id(&self) -> StepId {
        StepId::CheckConflict
    }

    fn title(&self, _params: &SourceParameters) -> String {
        msg!(MESSAGES.steps.check_conflict)
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        if ctx.state.append_suffix {
            return Ok(StepOutcome::Continue);
        }

        let candidate = ctx.source()?.candidate_name().map(str::to_string);
        let workspaces = ctx.list_workspaces().await?;
        let found = locate(
            &workspaces,
            ctx.params.factory_id(),
            ctx.params.policy(),
            candidate.as_deref(),
        );
        match found {
            Some(existing) => {
                info!(workspace = %existing.name, "Existing workspace matches this factory");
                Ok(StepOutcome::Conflict(existing.clone()))
            }
            None => Ok(StepOutcome::Continue),
        }
    }
}
