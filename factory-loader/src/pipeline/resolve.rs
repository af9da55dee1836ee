use async_trait::async_trait;
use factory_messages::{msg, MESSAGES};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::state::LoaderState;
use super::step::{LoaderStep, StepContext, StepId, StepOutcome};
use crate::devfile::Devfile;
use crate::error::{LoaderError, Result};
use crate::params::{SourceKind, SourceParameters};
use crate::prepare::RawSource;
use crate::services::{DevfileResolution, ResolveFailure};

/// Fetches the devfile or the pre-built resources.
pub struct ResolveStep;

fn classify(failure: ResolveFailure) -> LoaderError {
    match failure {
        ResolveFailure::InvalidDevfile(message) => LoaderError::InvalidDevfile(message),
        ResolveFailure::UnsupportedProvider(message) => LoaderError::UnsupportedProvider(message),
        ResolveFailure::Other(e) => LoaderError::Resolution(format!("{e:#}")),
    }
}

/// The resolution deadline, fixed on first use.
fn resolve_deadline(state: &mut LoaderState, timeout: Duration) -> Instant {
    *state
        .resolve_deadline
        .get_or_insert_with(|| Instant::now() + timeout)
}

impl ResolveStep {
    async fn resolve_resources(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let url = ctx.params.source_url();
        let deadline = resolve_deadline(ctx.state, ctx.config.resolve_timeout());
        let fetched = ctx
            .until_deadline(deadline, ctx.services.resolver.fetch_resources(url))
            .await?;
        let resources = match fetched {
            Some(result) => result.map_err(classify)?,
            None => {
                return Err(LoaderError::ResolutionTimeout {
                    kind: SourceKind::Resources,
                    timeout_secs: ctx.config.resolve_timeout_secs,
                })
            }
        };

        ctx.state.source = Some(RawSource::Resources(resources));
        ctx.record.title = msg!(MESSAGES.steps.resolve_resources_done, url = url);
        Ok(StepOutcome::Continue)
    }

    async fn resolve_devfile(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let url = ctx.params.source_url();

        if ctx.state.use_default_devfile {
            info!(%url, "Using the default devfile");
            ctx.state.source = Some(RawSource::Devfile(Devfile::default_for(url)));
            ctx.record.title = msg!(MESSAGES.steps.resolve_devfile_default, url = url);
            return Ok(StepOutcome::Continue);
        }

        let deadline = resolve_deadline(ctx.state, ctx.config.resolve_timeout());
        let resolved = ctx
            .until_deadline(
                deadline,
                ctx.services
                    .resolver
                    .resolve_devfile(url, ctx.params.overrides()),
            )
            .await?;
        let resolution = match resolved {
            Some(result) => result.map_err(classify)?,
            None => {
                return Err(LoaderError::ResolutionTimeout {
                    kind: SourceKind::Devfile,
                    timeout_secs: ctx.config.resolve_timeout_secs,
                })
            }
        };

        match resolution {
            DevfileResolution::Resolved(devfile) => {
                ctx.services.auth_attempts.clear(url);
                ctx.state.source = Some(RawSource::Devfile(devfile));
                ctx.record.title = msg!(MESSAGES.steps.resolve_devfile_done, url = url);
                Ok(StepOutcome::Continue)
            }
            DevfileResolution::AuthRedirectRequired { authentication_url } => {
                let attempts = ctx.services.auth_attempts.count(url);
                if attempts >= ctx.config.max_auth_redirects {
                    warn!(%url, attempts, "Giving up on authentication redirects");
                    return Err(LoaderError::AuthenticationLoop);
                }
                ctx.services.auth_attempts.increment(url);
                Ok(StepOutcome::Authenticate { authentication_url })
            }
        }
    }
}

#[async_trait]
impl LoaderStep for ResolveStep {
    fn id(&self) -> StepId {
        StepId::Resolve
    }

    fn title(&self, params: &SourceParameters) -> String {
        let url = params.source_url();
        match params.source_kind() {
            SourceKind::Devfile => msg!(MESSAGES.steps.resolve_devfile, url = url),
            SourceKind::Resources => msg!(MESSAGES.steps.resolve_resources, url = url),
        }
    }

    async fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        if ctx.state.source.is_some() {
            return Ok(StepOutcome::Continue);
        }
        match ctx.params.source_kind() {
            SourceKind::Devfile => self.resolve_devfile(ctx).await,
            SourceKind::Resources => self.resolve_resources(ctx).await,
        }
    }
}
