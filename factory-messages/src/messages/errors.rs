//! Error descriptions shown in alert bodies

pub struct ErrorMessages {
    pub auth_loop: &'static str,
    pub auth_required: &'static str,
    pub cancelled: &'static str,
    pub conflict: &'static str,
    pub creation_timeout: &'static str,
    pub invalid_devfile: &'static str,
    pub invalid_request: &'static str,
    pub missing_resources_url: &'static str,
    pub missing_url: &'static str,
    pub resolution_failed: &'static str,
    pub resolution_timeout: &'static str,
    pub resources_timeout: &'static str,
    pub store_unavailable: &'static str,
    pub submission_failed: &'static str,
    pub suffix_failed: &'static str,
    pub unexpected_creation_failure: &'static str,
    pub unsupported_policy: &'static str,
    pub unsupported_provider: &'static str,
}

pub const ERROR_MESSAGES: ErrorMessages = ErrorMessages {
    auth_loop: "The loader reached a limit of reloads while trying to resolve a devfile in a private repo. Please contact admin to check if OAuth is configured correctly.",
    auth_required: "Authentication is required to access {url}",
    cancelled: "The workspace creation has been cancelled.",
    conflict: "A workspace with the same name ({name}) has been found. Should you want to open the existing workspace or proceed to create a new one, please choose the corresponding action.",
    creation_timeout: "Workspace hasn't been created in the last {timeout} seconds.",
    invalid_devfile: "The Devfile in the git repository is invalid: {error}",
    invalid_request: "Could not resolve devfile from private repository because authentication request is missing a parameter, contains an invalid parameter, includes a parameter more than once, or is otherwise invalid.",
    missing_resources_url: "Devworkspace resources URL is missing.",
    missing_url: "Repository/Devfile URL is missing. Please specify it via url query param.",
    resolution_failed: "Failed to resolve the devfile: {error}",
    resolution_timeout: "Devfile hasn't been resolved in the last {timeout} seconds.",
    resources_timeout: "Pre-built resources haven't been fetched in the last {timeout} seconds.",
    store_unavailable: "Failed to read the list of workspaces: {error}",
    submission_failed: "Failed to create the workspace: {error}",
    suffix_failed: "Failed to generate a workspace name: {error}",
    unexpected_creation_failure: "The workspace creation unexpectedly failed.",
    unsupported_policy: "Unsupported create policy '{policy}' is specified while the only following are supported: peruser, perclick. Please fix 'policies.create' parameter and try again.",
    unsupported_provider: "Looking for a Devfile in the git repository failed: {error}",
};
