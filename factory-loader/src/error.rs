use factory_messages::{msg, MESSAGES};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

use crate::params::SourceKind;

pub type Result<T> = std::result::Result<T, LoaderError>;

/// Failures surfaced by the loader.
///
/// Collaborators report `anyhow` errors; they are mapped into this taxonomy at
/// the step boundary and rendered with the texts from `factory-messages`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// The query cannot be turned into source parameters. The message is
    /// already rendered.
    MalformedParameters(String),
    /// The resolver rejected the devfile as invalid.
    InvalidDevfile(String),
    /// The git provider of the source URL is not supported.
    UnsupportedProvider(String),
    /// Any other resolver failure.
    Resolution(String),
    ResolutionTimeout { kind: SourceKind, timeout_secs: u64 },
    AuthenticationLoop,
    CreationTimeout { timeout_secs: u64 },
    Submission(String),
    WorkspaceStore(String),
    Suffix(String),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    MalformedParameters,
    Resolution,
    ResolutionTimeout,
    AuthenticationLoop,
    CreationTimeout,
    Submission,
    WorkspaceStore,
    Suffix,
    Cancelled,
}

impl LoaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoaderError::MalformedParameters(_) => ErrorKind::MalformedParameters,
            LoaderError::InvalidDevfile(_)
            | LoaderError::UnsupportedProvider(_)
            | LoaderError::Resolution(_) => ErrorKind::Resolution,
            LoaderError::ResolutionTimeout { .. } => ErrorKind::ResolutionTimeout,
            LoaderError::AuthenticationLoop => ErrorKind::AuthenticationLoop,
            LoaderError::CreationTimeout { .. } => ErrorKind::CreationTimeout,
            LoaderError::Submission(_) => ErrorKind::Submission,
            LoaderError::WorkspaceStore(_) => ErrorKind::WorkspaceStore,
            LoaderError::Suffix(_) => ErrorKind::Suffix,
            LoaderError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether restarting the pipeline can lead anywhere.
    pub fn is_restartable(&self) -> bool {
        !matches!(
            self,
            LoaderError::MalformedParameters(_) | LoaderError::Cancelled
        )
    }

    /// Whether the default devfile can be used instead of the resolved one.
    pub fn offers_default_devfile(&self) -> bool {
        matches!(
            self,
            LoaderError::InvalidDevfile(_) | LoaderError::UnsupportedProvider(_)
        )
    }
}

impl Display for LoaderError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let errors = &MESSAGES.errors;
        let text = match self {
            LoaderError::MalformedParameters(s) => s.clone(),
            LoaderError::InvalidDevfile(s) => msg!(errors.invalid_devfile, error = s.as_str()),
            LoaderError::UnsupportedProvider(s) => {
                msg!(errors.unsupported_provider, error = s.as_str())
            }
            LoaderError::Resolution(s) => msg!(errors.resolution_failed, error = s.as_str()),
            LoaderError::ResolutionTimeout { kind, timeout_secs } => {
                let template = match kind {
                    SourceKind::Devfile => errors.resolution_timeout,
                    SourceKind::Resources => errors.resources_timeout,
                };
                msg!(template, timeout = timeout_secs.to_string())
            }
            LoaderError::AuthenticationLoop => msg!(errors.auth_loop),
            LoaderError::CreationTimeout { timeout_secs } => {
                msg!(errors.creation_timeout, timeout = timeout_secs.to_string())
            }
            LoaderError::Submission(s) => msg!(errors.submission_failed, error = s.as_str()),
            LoaderError::WorkspaceStore(s) => msg!(errors.store_unavailable, error = s.as_str()),
            LoaderError::Suffix(s) => msg!(errors.suffix_failed, error = s.as_str()),
            LoaderError::Cancelled => msg!(errors.cancelled),
        };
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_timeout_carries_configured_value() {
        let err = LoaderError::CreationTimeout { timeout_secs: 20 };
        assert_eq!(
            err.to_string(),
            "Workspace hasn't been created in the last 20 seconds."
        );
        assert_eq!(err.kind(), ErrorKind::CreationTimeout);
    }

    #[test]
    fn test_resolution_timeout_text_depends_on_source_kind() {
        let devfile = LoaderError::ResolutionTimeout {
            kind: SourceKind::Devfile,
            timeout_secs: 5,
        };
        let resources = LoaderError::ResolutionTimeout {
            kind: SourceKind::Resources,
            timeout_secs: 5,
        };
        assert!(devfile.to_string().starts_with("Devfile hasn't been resolved"));
        assert!(resources.to_string().starts_with("Pre-built resources"));
    }

    #[test]
    fn test_resolver_failures_share_a_kind() {
        for err in [
            LoaderError::InvalidDevfile("bad schema".into()),
            LoaderError::UnsupportedProvider("unknown host".into()),
            LoaderError::Resolution("boom".into()),
        ] {
            assert_eq!(err.kind(), ErrorKind::Resolution);
            assert!(err.is_restartable());
        }
        assert!(LoaderError::InvalidDevfile("x".into()).offers_default_devfile());
        assert!(!LoaderError::Resolution("x".into()).offers_default_devfile());
    }

    #[test]
    fn test_malformed_parameters_cannot_restart() {
        let err = LoaderError::MalformedParameters("missing url".into());
        assert!(!err.is_restartable());
        assert_eq!(err.to_string(), "missing url");
    }
}
