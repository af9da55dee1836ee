use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use factory_loader::memory::{
    InMemoryAuthAttempts, InMemoryWorkspaceStore, MaterializingCreator, RecordingNavigator,
    StaticResolver,
};
use factory_loader::services::SourceResolver;
use factory_loader::{
    Alert, ConflictResolution, FactoryLoader, LoaderConfig, LoaderServices, PipelineStatus,
    RawSource, StepStatus, StepView, Workspace,
};
use factory_messages::{msg, MESSAGES};

use super::{load_source, read};
use crate::cli::{OnConflict, SourceFile};

pub async fn handle_simulate(
    query: &str,
    source: &SourceFile,
    existing: Option<&Path>,
    config: Option<&Path>,
    on_conflict: Option<OnConflict>,
) -> Result<ExitCode> {
    let config = match config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::from_env(),
    };
    let existing = match existing {
        Some(path) => load_workspaces(path)?,
        None => Vec::new(),
    };
    let resolver: Arc<dyn SourceResolver> = match load_source(source)? {
        RawSource::Devfile(devfile) => Arc::new(StaticResolver::devfile(devfile)),
        RawSource::Resources(pair) => Arc::new(StaticResolver::resources(pair)),
    };

    let store = Arc::new(InMemoryWorkspaceStore::with_workspaces(existing));
    let services = LoaderServices::new(
        store.clone(),
        resolver,
        Arc::new(MaterializingCreator::new(store)),
        Arc::new(RecordingNavigator::new()),
        Arc::new(InMemoryAuthAttempts::new()),
    );
    let mut loader = FactoryLoader::from_query(query, services, config)?;

    let mut status = loader.run().await;
    if let (PipelineStatus::ConflictPending { .. }, Some(answer)) = (&status, on_conflict) {
        info!(?answer, "Answering the conflict prompt");
        loader.resolve_conflict(match answer {
            OnConflict::OpenExisting => ConflictResolution::OpenExisting,
            OnConflict::CreateNew => ConflictResolution::CreateNew,
        });
        status = loader.run().await;
    }

    for view in loader.steps() {
        println!("{}", step_line(&view));
    }
    if let Some(alert) = loader.alert() {
        println!();
        print_alert(&alert);
    }
    println!();
    println!("{}", outcome_line(&status));

    Ok(match status {
        PipelineStatus::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn load_workspaces(path: &Path) -> Result<Vec<Workspace>> {
    serde_yaml_ng::from_str(&read(path)?)
        .with_context(|| format!("Invalid workspace list {}", path.display()))
}

fn step_line(view: &StepView) -> String {
    let marker = if view.has_warning {
        "⚠"
    } else {
        match view.status {
            StepStatus::Pending => "○",
            StepStatus::Running => "◌",
            StepStatus::Succeeded => "✓",
            StepStatus::Failed => "✗",
        }
    };
    msg!(MESSAGES.cli.step_line, marker = marker, title = view.title.as_str())
}

fn print_alert(alert: &Alert) {
    println!(
        "{}",
        msg!(
            MESSAGES.cli.alert_header,
            severity = alert.severity.to_string(),
            title = alert.title.as_str(),
            body = alert.body.as_str()
        )
    );
    for action in &alert.actions {
        println!("{}", msg!(MESSAGES.cli.alert_action, action = action.label()));
    }
}

fn outcome_line(status: &PipelineStatus) -> String {
    let cli = &MESSAGES.cli;
    match status {
        PipelineStatus::Succeeded(target) => msg!(
            cli.outcome_success,
            namespace = target.namespace.as_str(),
            name = target.name.as_str()
        ),
        PipelineStatus::ConflictPending { existing } => {
            msg!(cli.outcome_conflict, name = existing.name.as_str())
        }
        PipelineStatus::AwaitingAuthentication { authentication_url } => {
            msg!(cli.outcome_auth, url = authentication_url.as_str())
        }
        PipelineStatus::Failed(error) => msg!(cli.outcome_failed, error = error.to_string()),
        PipelineStatus::Cancelled | PipelineStatus::Running => msg!(cli.outcome_cancelled),
    }
}
