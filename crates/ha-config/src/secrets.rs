//! Secrets loader for the customizer configuration
//!
//! Secrets live in `secrets.yaml` next to the configuration file so the API
//! password or token can be kept out of the main config.

use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the secrets file looked up next to the config file
pub const SECRETS_FILE: &str = "secrets.yaml";

/// Secrets store loaded from secrets.yaml
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    secrets: HashMap<String, String>,
    path: Option<PathBuf>,
}

impl Secrets {
    /// Load secrets from `secrets.yaml` inside `dir`
    ///
    /// A missing file yields an empty store; `!secret` lookups then fail
    /// individually.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        let path = dir.join(SECRETS_FILE);

        if !path.exists() {
            debug!("No secrets file at {:?}", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        let raw: HashMap<String, serde_yaml::Value> = if content.trim().is_empty() {
            HashMap::new()
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.clone(),
                source: e,
            })?
        };

        let secrets: HashMap<String, String> = raw
            .into_iter()
            .map(|(k, v)| (k, scalar_to_string(v)))
            .collect();

        debug!("Loaded {} secrets from {:?}", secrets.len(), path);

        Ok(Self {
            secrets,
            path: Some(path),
        })
    }

    /// Get a secret by key
    pub fn get(&self, key: &str) -> ConfigResult<&str> {
        self.secrets
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| ConfigError::SecretNotFound {
                key: key.to_string(),
            })
    }

    /// Path the secrets were loaded from, if a file existed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if secrets store is empty
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        other => serde_yaml::to_string(&other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_secrets() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SECRETS_FILE),
            "api_password: hunter2\nport: 8123\nenabled: true\n",
        )
        .unwrap();

        let secrets = Secrets::load(dir.path()).unwrap();
        assert_eq!(secrets.get("api_password").unwrap(), "hunter2");
        assert_eq!(secrets.get("port").unwrap(), "8123");
        assert_eq!(secrets.get("enabled").unwrap(), "true");
        assert!(secrets.path().is_some());
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SECRETS_FILE), "key: value\n").unwrap();

        let secrets = Secrets::load(dir.path()).unwrap();
        assert!(matches!(
            secrets.get("nonexistent"),
            Err(ConfigError::SecretNotFound { .. })
        ));
    }

    #[test]
    fn test_no_secrets_file() {
        let dir = TempDir::new().unwrap();
        let secrets = Secrets::load(dir.path()).unwrap();
        assert!(secrets.is_empty());
        assert!(secrets.path().is_none());
    }

    #[test]
    fn test_empty_secrets_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SECRETS_FILE), "").unwrap();
        assert!(Secrets::load(dir.path()).unwrap().is_empty());
    }
}
