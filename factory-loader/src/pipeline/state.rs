use tokio::time::Instant;

use crate::error::LoaderError;
use crate::prepare::{PreparedResource, RawSource};

/// Progress of one loader run. Reset by a restart.
#[derive(Debug, Clone)]
pub struct LoaderState {
    pub current_step: usize,
    pub last_error: Option<LoaderError>,
    /// Cleared right before the creation request goes out and never set again
    /// for this state.
    pub should_create: bool,
    pub resolved_name: Option<String>,
    pub warning: Option<String>,
    pub source: Option<RawSource>,
    pub prepared: Option<PreparedResource>,
    /// The user asked for a new workspace despite a match.
    pub append_suffix: bool,
    pub use_default_devfile: bool,
    /// Fixed when resolution first starts; re-entry keeps waiting for it.
    pub resolve_deadline: Option<Instant>,
    pub create_deadline: Option<Instant>,
}

impl Default for LoaderState {
    fn default() -> Self {
        Self {
            current_step: 0,
            last_error: None,
            should_create: true,
            resolved_name: None,
            warning: None,
            source: None,
            prepared: None,
            append_suffix: false,
            use_default_devfile: false,
            resolve_deadline: None,
            create_deadline: None,
        }
    }
}
