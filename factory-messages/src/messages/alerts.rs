//! Alert titles and action labels

pub struct AlertMessages {
    pub action_continue_default: &'static str,
    pub action_create_new: &'static str,
    pub action_open_existing: &'static str,
    pub action_restart: &'static str,
    pub title_conflict: &'static str,
    pub title_failed: &'static str,
    pub title_warning: &'static str,
}

pub const ALERT_MESSAGES: AlertMessages = AlertMessages {
    action_continue_default: "Continue with the default devfile",
    action_create_new: "Create a new workspace",
    action_open_existing: "Open the existing workspace",
    action_restart: "Click to try again",
    title_conflict: "Existing workspace found",
    title_failed: "Failed to create the workspace",
    title_warning: "Warning",
};
