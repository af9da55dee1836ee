//! What a front end renders: per-step rows and at most one alert.

use factory_messages::{msg, MESSAGES};
use serde::Serialize;
use std::fmt;

use super::step::{StepId, StepStatus};
use crate::error::LoaderError;
use crate::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: StepId,
    pub title: String,
    pub status: StepStatus,
    pub has_error: bool,
    pub has_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Danger,
    Warning,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Danger => f.write_str("danger"),
            AlertSeverity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertAction {
    Restart,
    OpenExisting,
    CreateNew,
    ContinueWithDefaultDevfile,
}

impl AlertAction {
    pub fn label(&self) -> &'static str {
        let alerts = &MESSAGES.alerts;
        match self {
            AlertAction::Restart => alerts.action_restart,
            AlertAction::OpenExisting => alerts.action_open_existing,
            AlertAction::CreateNew => alerts.action_create_new,
            AlertAction::ContinueWithDefaultDevfile => alerts.action_continue_default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub severity: AlertSeverity,
    pub actions: Vec<AlertAction>,
}

impl Alert {
    pub fn for_error(error: &LoaderError) -> Self {
        let mut actions = Vec::new();
        if error.offers_default_devfile() {
            actions.push(AlertAction::ContinueWithDefaultDevfile);
        }
        if error.is_restartable() {
            actions.push(AlertAction::Restart);
        }
        Self {
            title: msg!(MESSAGES.alerts.title_failed),
            body: error.to_string(),
            severity: AlertSeverity::Danger,
            actions,
        }
    }

    pub fn for_conflict(existing: &Workspace) -> Self {
        Self {
            title: msg!(MESSAGES.alerts.title_conflict),
            body: msg!(MESSAGES.errors.conflict, name = existing.name.as_str()),
            severity: AlertSeverity::Warning,
            actions: vec![AlertAction::OpenExisting, AlertAction::CreateNew],
        }
    }

    pub fn for_warning(warning: &str) -> Self {
        Self {
            title: msg!(MESSAGES.alerts.title_warning),
            body: warning.to_string(),
            severity: AlertSeverity::Warning,
            actions: Vec::new(),
        }
    }
}
