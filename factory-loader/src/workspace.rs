use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::provenance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkspacePhase {
    #[default]
    Unknown,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failing,
    Failed,
    Terminating,
}

/// A workspace as seen through the workspace store. Read-only for the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub uid: String,
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub phase: WorkspacePhase,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Workspace {
    pub fn reference(&self) -> WorkspaceRef {
        WorkspaceRef {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Factory id recorded when the workspace was created from a factory link.
    pub fn factory_params(&self) -> Option<String> {
        let source = self.annotations.get(provenance::DEVWORKSPACE_DEVFILE_SOURCE)?;
        provenance::factory_params(source)
    }
}

/// Where the user is sent once the workspace exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceRef {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for WorkspaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
