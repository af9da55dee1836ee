//! Turning a resolved source into what gets submitted.
//!
//! Preparation stamps the provenance annotation, settles the final names and
//! applies the requested storage type. It works on a copy and only fails when
//! the suffix generator does.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::devfile::{Devfile, DEVWORKSPACE_METADATA_ANNOTATION, DEVWORKSPACE_STORAGE_TYPE_ATTR};
use crate::error::{LoaderError, Result};
use crate::naming::{self, SuffixGenerator, SUFFIX_LENGTH};
use crate::params::{SourceKind, StorageType};
use crate::provenance::{merge_factory_params, DEVWORKSPACE_DEVFILE_SOURCE};
use crate::resources::ResourcePair;

/// Name template used for devfiles that carry neither a name nor a template.
pub const FALLBACK_NAME_TEMPLATE: &str = "wksp-";

/// What the resolver produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSource {
    Devfile(Devfile),
    Resources(ResourcePair),
}

impl RawSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            RawSource::Devfile(_) => SourceKind::Devfile,
            RawSource::Resources(_) => SourceKind::Resources,
        }
    }

    /// The name the workspace would get without a suffix, if it is fixed.
    pub fn candidate_name(&self) -> Option<&str> {
        let metadata_name = match self {
            RawSource::Devfile(devfile) => &devfile.metadata.name,
            RawSource::Resources(pair) => &pair.workspace.metadata.name,
        };
        let generate_name = match self {
            RawSource::Devfile(devfile) => &devfile.metadata.generate_name,
            RawSource::Resources(pair) => &pair.workspace.metadata.generate_name,
        };
        match generate_name {
            Some(_) => None,
            None => metadata_name.as_deref(),
        }
    }
}

/// A source ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PreparedResource {
    Devfile(Devfile),
    Resources(ResourcePair),
}

impl PreparedResource {
    /// Final workspace name.
    pub fn name(&self) -> Option<&str> {
        match self {
            PreparedResource::Devfile(devfile) => devfile.metadata.name.as_deref(),
            PreparedResource::Resources(pair) => pair.workspace.metadata.name.as_deref(),
        }
    }

    pub fn factory_params(&self) -> Option<String> {
        match self {
            PreparedResource::Devfile(devfile) => devfile.factory_params(),
            PreparedResource::Resources(pair) => pair.factory_params(),
        }
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        match self {
            PreparedResource::Devfile(devfile) => Ok(serde_yaml_ng::to_string(devfile)?),
            PreparedResource::Resources(pair) => pair.to_yaml(),
        }
    }
}

pub struct ResourcePreparer<'a> {
    suffixes: &'a dyn SuffixGenerator,
}

impl<'a> ResourcePreparer<'a> {
    pub fn new(suffixes: &'a dyn SuffixGenerator) -> Self {
        Self { suffixes }
    }

    pub fn prepare(
        &self,
        raw: &RawSource,
        factory_id: &str,
        storage_type: Option<StorageType>,
        append_suffix: bool,
    ) -> Result<PreparedResource> {
        match raw {
            RawSource::Devfile(devfile) => self
                .prepare_devfile(devfile, factory_id, storage_type, append_suffix)
                .map(PreparedResource::Devfile),
            RawSource::Resources(pair) => self
                .prepare_resources(pair, factory_id, storage_type, append_suffix)
                .map(PreparedResource::Resources),
        }
    }

    pub fn prepare_devfile(
        &self,
        devfile: &Devfile,
        factory_id: &str,
        storage_type: Option<StorageType>,
        append_suffix: bool,
    ) -> Result<Devfile> {
        let mut devfile = devfile.clone();

        let attributes = devfile.workspace_attributes_mut();
        let mut annotations = match attributes.remove(DEVWORKSPACE_METADATA_ANNOTATION) {
            Some(Value::Object(annotations)) => annotations,
            Some(_) => {
                debug!("Replacing malformed {} attribute", DEVWORKSPACE_METADATA_ANNOTATION);
                Map::new()
            }
            None => Map::new(),
        };
        let source = merge_factory_params(
            annotations
                .get(DEVWORKSPACE_DEVFILE_SOURCE)
                .and_then(Value::as_str),
            factory_id,
        );
        annotations.insert(DEVWORKSPACE_DEVFILE_SOURCE.to_string(), Value::String(source));
        attributes.insert(
            DEVWORKSPACE_METADATA_ANNOTATION.to_string(),
            Value::Object(annotations),
        );
        apply_storage_type(attributes, storage_type);

        let metadata = &mut devfile.metadata;
        let template = match (metadata.generate_name.take(), &metadata.name) {
            (Some(template), _) => Some(template),
            (None, None) => Some(FALLBACK_NAME_TEMPLATE.to_string()),
            (None, Some(_)) => None,
        };
        if let Some(template) = template {
            metadata.name = Some(naming::from_template(&template, &self.suffix()?));
        } else if append_suffix {
            if let Some(name) = metadata.name.take() {
                metadata.name = Some(naming::with_suffix(&name, &self.suffix()?));
            }
        }

        Ok(devfile)
    }

    pub fn prepare_resources(
        &self,
        pair: &ResourcePair,
        factory_id: &str,
        storage_type: Option<StorageType>,
        append_suffix: bool,
    ) -> Result<ResourcePair> {
        let mut pair = pair.clone();

        let annotations = pair
            .workspace
            .metadata
            .annotations
            .get_or_insert_with(BTreeMap::new);
        let source = merge_factory_params(
            annotations
                .get(DEVWORKSPACE_DEVFILE_SOURCE)
                .map(String::as_str),
            factory_id,
        );
        annotations.insert(DEVWORKSPACE_DEVFILE_SOURCE.to_string(), source);

        let attributes = &mut pair.workspace.spec.template.attributes;
        if storage_type.is_some_and(|storage_type| storage_type.is_explicit()) {
            attributes.get_or_insert_with(Map::new);
        }
        if let Some(attributes) = attributes {
            apply_storage_type(attributes, storage_type);
        }

        let metadata = &mut pair.workspace.metadata;
        let template = match (metadata.generate_name.take(), &metadata.name) {
            (Some(template), _) => Some(template),
            (None, None) => Some(FALLBACK_NAME_TEMPLATE.to_string()),
            (None, Some(_)) => None,
        };
        if template.is_none() && !append_suffix {
            return Ok(pair);
        }

        let suffix = self.suffix()?;
        let name = match template {
            Some(template) => Some(naming::from_template(&template, &suffix)),
            None => metadata
                .name
                .as_deref()
                .map(|name| naming::with_suffix(name, &suffix)),
        };
        metadata.name = name;

        if let Some(old_name) = pair.template.metadata.name.clone() {
            let new_name = naming::with_suffix(&old_name, &suffix);
            rename_template_references(&mut pair, &old_name, &new_name);
            pair.template.metadata.name = Some(new_name);
        }

        Ok(pair)
    }

    fn suffix(&self) -> Result<String> {
        self.suffixes
            .generate(SUFFIX_LENGTH)
            .map_err(|e| LoaderError::Suffix(e.to_string()))
    }
}

fn apply_storage_type(attributes: &mut Map<String, Value>, storage_type: Option<StorageType>) {
    match storage_type {
        Some(storage_type) if storage_type.is_explicit() => {
            attributes.insert(
                DEVWORKSPACE_STORAGE_TYPE_ATTR.to_string(),
                Value::String(storage_type.to_string()),
            );
        }
        Some(_) => {
            if attributes.remove(DEVWORKSPACE_STORAGE_TYPE_ATTR).is_some() {
                debug!("Cleared storage type, falling back to the platform default");
            }
        }
        None => {}
    }
}

/// Point contributions and plugin components at the renamed template.
fn rename_template_references(pair: &mut ResourcePair, old_name: &str, new_name: &str) {
    for contribution in &mut pair.workspace.spec.contributions {
        if contribution.name == old_name {
            contribution.name = new_name.to_string();
        }
        if let Some(kubernetes) = &mut contribution.kubernetes {
            if kubernetes.name == old_name {
                kubernetes.name = new_name.to_string();
            }
        }
    }

    for component in &mut pair.workspace.spec.template.components {
        if component.get("name").and_then(Value::as_str) == Some(old_name) {
            component["name"] = Value::String(new_name.to_string());
        }
        if let Some(reference) = component.pointer_mut("/plugin/kubernetes/name") {
            if reference.as_str() == Some(old_name) {
                *reference = Value::String(new_name.to_string());
            }
        }
    }
}
