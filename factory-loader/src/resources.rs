//! Pre-built DevWorkspace / DevWorkspaceTemplate pairs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::provenance;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDescriptor {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: WorkspaceSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributions: Vec<Contribution>,
    #[serde(default)]
    pub template: WorkspaceTemplateSpec,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceTemplateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An editor or plugin contributed to the workspace by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePair {
    pub workspace: WorkspaceDescriptor,
    pub template: TemplateDescriptor,
}

impl ResourcePair {
    /// Parse a multi-document YAML bundle holding one DevWorkspace and one
    /// DevWorkspaceTemplate, in any order.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let mut workspace = None;
        let mut template = None;
        for document in serde_yaml_ng::Deserializer::from_str(content) {
            let value = serde_yaml_ng::Value::deserialize(document)?;
            match value.get("kind").and_then(|kind| kind.as_str()) {
                Some("DevWorkspace") => workspace = Some(serde_yaml_ng::from_value(value)?),
                Some("DevWorkspaceTemplate") => template = Some(serde_yaml_ng::from_value(value)?),
                Some(other) => anyhow::bail!("Unexpected resource kind '{other}'"),
                None if value.is_null() => {}
                None => anyhow::bail!("Resource without a kind"),
            }
        }
        match (workspace, template) {
            (Some(workspace), Some(template)) => Ok(Self { workspace, template }),
            (None, _) => anyhow::bail!("No DevWorkspace found in the resources"),
            (_, None) => anyhow::bail!("No DevWorkspaceTemplate found in the resources"),
        }
    }

    /// Serialize back to a two-document YAML bundle.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(format!(
            "{}---\n{}",
            serde_yaml_ng::to_string(&self.workspace)?,
            serde_yaml_ng::to_string(&self.template)?
        ))
    }

    pub fn devfile_source(&self) -> Option<&str> {
        self.workspace
            .metadata
            .annotations
            .as_ref()?
            .get(provenance::DEVWORKSPACE_DEVFILE_SOURCE)
            .map(String::as_str)
    }

    pub fn factory_params(&self) -> Option<String> {
        provenance::factory_params(self.devfile_source()?)
    }
}
