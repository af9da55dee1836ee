//! Source parameters parsed from a factory query string.

use factory_messages::{msg, MESSAGES};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::{LoaderError, Result};

pub const FACTORY_URL_PARAM: &str = "url";
pub const RESOURCES_URL_PARAM: &str = "devWorkspace";
pub const POLICIES_CREATE_PARAM: &str = "policies.create";
pub const STORAGE_TYPE_PARAM: &str = "storageType";
pub const EDITOR_PARAM: &str = "che-editor";
pub const ERROR_CODE_PARAM: &str = "error_code";
pub const OVERRIDE_PREFIX: &str = "override.";

/// How an existing workspace is reused for a factory link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatePolicy {
    /// One workspace per user and factory; an existing one is reopened.
    #[default]
    PerUser,
    /// A new workspace on every click.
    PerClick,
}

impl CreatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreatePolicy::PerUser => "peruser",
            CreatePolicy::PerClick => "perclick",
        }
    }
}

impl fmt::Display for CreatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreatePolicy {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "peruser" => Ok(CreatePolicy::PerUser),
            "perclick" => Ok(CreatePolicy::PerClick),
            other => Err(LoaderError::MalformedParameters(msg!(
                MESSAGES.errors.unsupported_policy,
                policy = other
            ))),
        }
    }
}

/// Value of the `controller.devfile.io/storage-type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageType {
    Ephemeral,
    Async,
    /// The platform default, also accepted as `persistent`.
    #[serde(alias = "persistent")]
    PerUser,
    PerWorkspace,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Ephemeral => "ephemeral",
            StorageType::Async => "async",
            StorageType::PerUser => "per-user",
            StorageType::PerWorkspace => "per-workspace",
        }
    }

    /// Whether the type needs an explicit attribute. `per-user` is what the
    /// platform picks when the attribute is absent.
    pub fn is_explicit(&self) -> bool {
        !matches!(self, StorageType::PerUser)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ephemeral" => Ok(StorageType::Ephemeral),
            "async" => Ok(StorageType::Async),
            "per-user" | "persistent" => Ok(StorageType::PerUser),
            "per-workspace" => Ok(StorageType::PerWorkspace),
            other => Err(format!("unknown storage type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A devfile or a repository containing one.
    Devfile,
    /// A pre-built DevWorkspace and DevWorkspaceTemplate pair.
    Resources,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Devfile => f.write_str("devfile"),
            SourceKind::Resources => f.write_str("resources"),
        }
    }
}

/// Everything the loader needs to know about a factory link.
///
/// Built once from the query and never mutated afterwards; the factory id is
/// derived from the normalized parameters so equivalent links share an id.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceParameters {
    source_url: String,
    factory_id: String,
    policy: CreatePolicy,
    storage_type: Option<StorageType>,
    editor_id: Option<String>,
    overrides: IndexMap<String, String>,
    source_kind: SourceKind,
    params: BTreeMap<String, String>,
}

impl SourceParameters {
    /// Parse a raw, url-encoded query string. A leading `?` is accepted.
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.trim().trim_start_matches('?');
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Build from already decoded key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = BTreeMap::new();
        let mut overrides = IndexMap::new();
        for (key, value) in pairs {
            let key = key.as_ref().trim();
            if key.is_empty() {
                continue;
            }
            let value = value.as_ref().trim().to_string();
            if let Some(path) = key.strip_prefix(OVERRIDE_PREFIX) {
                // Re-inserting keeps the first position, so remove to honour
                // the position of the last occurrence.
                overrides.shift_remove(path);
                overrides.insert(path.to_string(), value.clone());
            }
            params.insert(key.to_string(), value);
        }

        let non_empty = |key: &str| {
            params
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        let (source_kind, source_url) = match non_empty(RESOURCES_URL_PARAM) {
            Some(url) => (SourceKind::Resources, url),
            None => match non_empty(FACTORY_URL_PARAM) {
                Some(url) => (SourceKind::Devfile, url),
                None => {
                    return Err(LoaderError::MalformedParameters(msg!(
                        MESSAGES.errors.missing_url
                    )))
                }
            },
        };

        if non_empty(ERROR_CODE_PARAM).as_deref() == Some("invalid_request") {
            return Err(LoaderError::MalformedParameters(msg!(
                MESSAGES.errors.invalid_request
            )));
        }

        let policy = match non_empty(POLICIES_CREATE_PARAM) {
            Some(value) => value.parse()?,
            None => CreatePolicy::default(),
        };

        let storage_type = non_empty(STORAGE_TYPE_PARAM).and_then(|value| {
            value
                .parse::<StorageType>()
                .map_err(|e| warn!(storage_type = %value, "Ignoring storage type: {}", e))
                .ok()
        });

        let factory_id = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        Ok(Self {
            source_url,
            factory_id,
            policy,
            storage_type,
            editor_id: non_empty(EDITOR_PARAM),
            overrides,
            source_kind,
            params,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Deterministic identifier of the factory link, stamped into the
    /// provenance annotation of every workspace it creates.
    pub fn factory_id(&self) -> &str {
        &self.factory_id
    }

    pub fn policy(&self) -> CreatePolicy {
        self.policy
    }

    pub fn storage_type(&self) -> Option<StorageType> {
        self.storage_type
    }

    pub fn editor_id(&self) -> Option<&str> {
        self.editor_id.as_deref()
    }

    /// `override.*` parameters keyed by the attribute path, in query order.
    pub fn overrides(&self) -> &IndexMap<String, String> {
        &self.overrides
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// All normalized parameters, sorted by key.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_id_ignores_parameter_order() {
        let a = SourceParameters::parse("?url=https://repo&policies.create=perclick&che-editor=code")
            .unwrap();
        let b = SourceParameters::parse("che-editor=code&policies.create=perclick&url=https://repo")
            .unwrap();
        assert_eq!(a.factory_id(), b.factory_id());
        assert_eq!(
            a.factory_id(),
            "che-editor=code&policies.create=perclick&url=https://repo"
        );
    }

    #[test]
    fn test_single_url_factory_id() {
        let params = SourceParameters::parse("url=https%3A%2F%2Ffactory-url").unwrap();
        assert_eq!(params.factory_id(), "url=https://factory-url");
        assert_eq!(params.source_url(), "https://factory-url");
        assert_eq!(params.source_kind(), SourceKind::Devfile);
        assert_eq!(params.policy(), CreatePolicy::PerUser);
    }

    #[test]
    fn test_normalization() {
        let params = SourceParameters::from_pairs([
            (" url ", " https://first "),
            ("", "dropped"),
            ("url", "https://second"),
        ])
        .unwrap();
        assert_eq!(params.source_url(), "https://second");
        assert_eq!(params.params().len(), 1);
    }

    #[test]
    fn test_missing_url_is_malformed() {
        let err = SourceParameters::parse("policies.create=perclick&url=").unwrap_err();
        assert_eq!(
            err,
            LoaderError::MalformedParameters(msg!(MESSAGES.errors.missing_url))
        );
    }

    #[test]
    fn test_unsupported_policy_is_malformed() {
        let err = SourceParameters::parse("url=https://repo&policies.create=always").unwrap_err();
        assert!(err.to_string().contains("'always'"));
        assert!(!err.is_restartable());
    }

    #[test]
    fn test_empty_policy_defaults_to_peruser() {
        let params = SourceParameters::parse("url=https://repo&policies.create=").unwrap();
        assert_eq!(params.policy(), CreatePolicy::PerUser);
    }

    #[test]
    fn test_invalid_request_error_code() {
        let err = SourceParameters::parse("url=https://repo&error_code=invalid_request").unwrap_err();
        assert!(matches!(err, LoaderError::MalformedParameters(_)));

        let params = SourceParameters::parse("url=https://repo&error_code=access_denied").unwrap();
        assert_eq!(params.source_url(), "https://repo");
    }

    #[test]
    fn test_resources_source_kind() {
        let params =
            SourceParameters::parse("url=https://repo&devWorkspace=https://host/resources.yaml")
                .unwrap();
        assert_eq!(params.source_kind(), SourceKind::Resources);
        assert_eq!(params.source_url(), "https://host/resources.yaml");
    }

    #[test]
    fn test_storage_type() {
        let params = SourceParameters::parse("url=https://repo&storageType=persistent").unwrap();
        assert_eq!(params.storage_type(), Some(StorageType::PerUser));

        let params = SourceParameters::parse("url=https://repo&storageType=ephemeral").unwrap();
        assert_eq!(params.storage_type(), Some(StorageType::Ephemeral));

        let params = SourceParameters::parse("url=https://repo&storageType=tmpfs").unwrap();
        assert_eq!(params.storage_type(), None);
    }

    #[test]
    fn test_overrides_keep_query_order() {
        let params = SourceParameters::parse(
            "url=https://repo&override.metadata.name=custom&override.attributes.a=1&che-editor=che-incubator/che-code/latest",
        )
        .unwrap();
        let keys: Vec<_> = params.overrides().keys().cloned().collect();
        assert_eq!(keys, vec!["metadata.name", "attributes.a"]);
        assert_eq!(params.editor_id(), Some("che-incubator/che-code/latest"));
    }
}
