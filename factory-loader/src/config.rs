use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// Loader timings and defaults. Missing keys fall back to the environment,
/// then to the built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,

    #[serde(default = "default_create_timeout")]
    pub create_timeout_secs: u64,

    /// Shortest time a step stays visible. `0` disables the delay.
    #[serde(default = "default_min_step_duration")]
    pub min_step_duration_ms: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_auth_redirects")]
    pub max_auth_redirects: u32,

    /// Namespace passed to the creation API.
    #[serde(default = "default_namespace")]
    pub namespace: Option<String>,

    /// Loader route the OAuth provider sends the user back to.
    #[serde(default = "default_auth_return_path")]
    pub auth_return_path: String,
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn default_resolve_timeout() -> u64 {
    env_u64("FACTORY_RESOLVE_TIMEOUT").unwrap_or(20)
}

fn default_create_timeout() -> u64 {
    env_u64("FACTORY_CREATE_TIMEOUT").unwrap_or(20)
}

fn default_min_step_duration() -> u64 {
    env_u64("FACTORY_MIN_STEP_DURATION_MS").unwrap_or(200)
}

fn default_poll_interval() -> u64 {
    env_u64("FACTORY_POLL_INTERVAL_MS").unwrap_or(500)
}

fn default_max_auth_redirects() -> u32 {
    2
}

fn default_namespace() -> Option<String> {
    std::env::var("FACTORY_NAMESPACE")
        .ok()
        .filter(|s| !s.is_empty())
}

fn default_auth_return_path() -> String {
    "/f".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_secs: default_resolve_timeout(),
            create_timeout_secs: default_create_timeout(),
            min_step_duration_ms: default_min_step_duration(),
            poll_interval_ms: default_poll_interval(),
            max_auth_redirects: default_max_auth_redirects(),
            namespace: default_namespace(),
            auth_return_path: default_auth_return_path(),
        }
    }
}

impl LoaderConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn min_step_duration(&self) -> Duration {
        Duration::from_millis(self.min_step_duration_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for name in [
            "FACTORY_RESOLVE_TIMEOUT",
            "FACTORY_CREATE_TIMEOUT",
            "FACTORY_MIN_STEP_DURATION_MS",
            "FACTORY_POLL_INTERVAL_MS",
            "FACTORY_NAMESPACE",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = LoaderConfig::default();
        assert_eq!(config.resolve_timeout_secs, 20);
        assert_eq!(config.create_timeout_secs, 20);
        assert_eq!(config.min_step_duration_ms, 200);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.max_auth_redirects, 2);
        assert_eq!(config.namespace, None);
        assert_eq!(config.auth_return_path, "/f");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("FACTORY_CREATE_TIMEOUT", "45");
        std::env::set_var("FACTORY_NAMESPACE", "user-che");
        std::env::set_var("FACTORY_POLL_INTERVAL_MS", "not-a-number");

        let config = LoaderConfig::from_env();
        assert_eq!(config.create_timeout(), Duration::from_secs(45));
        assert_eq!(config.namespace.as_deref(), Some("user-che"));
        assert_eq!(config.poll_interval_ms, 500);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_partial_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "create_timeout_secs: 5\nmin_step_duration_ms: 0").unwrap();

        let config = LoaderConfig::load(file.path()).unwrap();
        assert_eq!(config.create_timeout_secs, 5);
        assert_eq!(config.min_step_duration(), Duration::ZERO);
        assert_eq!(config.resolve_timeout_secs, 20);
    }

    #[test]
    #[serial]
    fn test_load_errors() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            LoaderConfig::load(&missing),
            Err(ConfigError::Io(_))
        ));

        let invalid = dir.path().join("invalid.yaml");
        std::fs::write(&invalid, "create_timeout_secs: [soon]").unwrap();
        assert!(matches!(
            LoaderConfig::load(&invalid),
            Err(ConfigError::Parse(_))
        ));
    }
}
