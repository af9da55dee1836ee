//! Devfile documents, as far as the loader needs to look into them.
//!
//! Only the fields the preparer touches are typed. Everything else is kept in
//! the flattened `extra` maps so a document survives preparation unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::provenance;

pub const DEVWORKSPACE_STORAGE_TYPE_ATTR: &str = "controller.devfile.io/storage-type";
pub const DEVWORKSPACE_METADATA_ANNOTATION: &str = "dw.metadata.annotations";

/// Schema version that keeps workspace attributes under `metadata.attributes`.
pub const LEGACY_SCHEMA_VERSION: &str = "2.0.0";
pub const DEFAULT_SCHEMA_VERSION: &str = "2.2.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub metadata: DevfileMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevfileMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Devfile {
    pub fn uses_legacy_schema(&self) -> bool {
        self.schema_version.as_deref() == Some(LEGACY_SCHEMA_VERSION)
    }

    /// Workspace attributes in the location matching the schema version.
    pub fn workspace_attributes(&self) -> Option<&Map<String, Value>> {
        if self.uses_legacy_schema() {
            self.metadata.attributes.as_ref()
        } else {
            self.attributes.as_ref()
        }
    }

    pub fn workspace_attributes_mut(&mut self) -> &mut Map<String, Value> {
        if self.uses_legacy_schema() {
            self.metadata.attributes.get_or_insert_with(Map::new)
        } else {
            self.attributes.get_or_insert_with(Map::new)
        }
    }

    pub fn storage_type(&self) -> Option<&str> {
        self.workspace_attributes()?
            .get(DEVWORKSPACE_STORAGE_TYPE_ATTR)?
            .as_str()
    }

    /// Raw `che.eclipse.org/devfile-source` value, if any.
    pub fn devfile_source(&self) -> Option<&str> {
        self.workspace_attributes()?
            .get(DEVWORKSPACE_METADATA_ANNOTATION)?
            .get(provenance::DEVWORKSPACE_DEVFILE_SOURCE)?
            .as_str()
    }

    /// Factory id recorded in the provenance annotation.
    pub fn factory_params(&self) -> Option<String> {
        provenance::factory_params(self.devfile_source()?)
    }

    /// Devfile used when the repository has none the loader can use.
    ///
    /// The project and the name template are derived from the source URL.
    pub fn default_for(source_url: &str) -> Self {
        let project = project_name_from_url(source_url);
        Devfile {
            schema_version: Some(DEFAULT_SCHEMA_VERSION.to_string()),
            metadata: DevfileMetadata {
                generate_name: Some(format!("{project}-")),
                ..Default::default()
            },
            projects: Some(vec![json!({
                "name": project,
                "git": { "remotes": { "origin": source_url } },
            })]),
            ..Default::default()
        }
    }
}

/// Repository name usable as a DNS label.
///
/// Takes the last meaningful path segment (before `tree`, `blob` or `-`
/// branch markers), drops a `.git` suffix and replaces anything outside
/// `[a-z0-9-]`.
pub fn project_name_from_url(source_url: &str) -> String {
    let segments: Vec<String> = match url::Url::parse(source_url) {
        Ok(parsed) => parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        Err(_) => source_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    };

    let end = segments
        .iter()
        .position(|s| matches!(s.as_str(), "tree" | "blob" | "-" | "src"))
        .unwrap_or(segments.len());
    let raw = segments[..end].last().map(String::as_str).unwrap_or_default();
    let raw = raw.strip_suffix(".git").unwrap_or(raw);

    let sanitized: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('-');
    if sanitized.is_empty() {
        "project".to_string()
    } else {
        sanitized.to_string()
    }
}
