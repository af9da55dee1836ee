//! Loader step titles

pub struct StepMessages {
    pub apply: &'static str,
    pub check_conflict: &'static str,
    pub locate: &'static str,
    pub prepare: &'static str,
    pub resolve_devfile: &'static str,
    pub resolve_devfile_default: &'static str,
    pub resolve_devfile_done: &'static str,
    pub resolve_resources: &'static str,
    pub resolve_resources_done: &'static str,
    pub warning: &'static str,
}

pub const STEP_MESSAGES: StepMessages = StepMessages {
    apply: "Creating a workspace",
    check_conflict: "Checking for existing workspaces",
    locate: "Looking for an existing workspace",
    prepare: "Preparing the workspace",
    resolve_devfile: "Inspecting repo {url} for a devfile",
    resolve_devfile_default: "Devfile could not be found in {url}. Applying the default configuration",
    resolve_devfile_done: "Devfile found in repo {url}",
    resolve_resources: "Fetching pre-built resources from {url}",
    resolve_resources_done: "Pre-built resources fetched from {url}",
    warning: "Warning: {warning}",
};
