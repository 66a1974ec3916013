//! YAML configuration loader with custom tag support
//!
//! Supports two custom YAML tags:
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution
//!
//! JSON is a subset of YAML, so a `config.json` loads through the same path.

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving `!secret` and `!env_var` tags
pub struct YamlLoader {
    /// Directory secrets.yaml was looked up in
    config_dir: PathBuf,
    /// Secrets store
    secrets: Secrets,
}

impl YamlLoader {
    /// Create a new YAML loader for the given config directory
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;
        match secrets.path() {
            Some(path) if !secrets.is_empty() => debug!("Using secrets from {:?}", path),
            _ => trace!("No secrets available in {:?}", config_dir),
        }

        Ok(Self {
            config_dir,
            secrets,
        })
    }

    /// Load and process a YAML file
    ///
    /// Relative paths resolve against the config directory.
    pub fn load_file(&self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.load_string(&content, &path)
    }

    /// Load and process YAML from a string
    ///
    /// An empty document loads as `Value::Null`.
    pub fn load_string(&self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.process_value(value)
    }

    /// Process a YAML value, handling custom tags
    fn process_value(&self, value: Value) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.process_tagged(*tagged),
            Value::Mapping(map) => {
                let mut result = serde_yaml::Mapping::new();
                for (k, v) in map {
                    result.insert(k, self.process_value(v)?);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => {
                let result: ConfigResult<Vec<Value>> =
                    seq.into_iter().map(|v| self.process_value(v)).collect();
                Ok(Value::Sequence(result?))
            }
            _ => Ok(value),
        }
    }

    /// Process a tagged value
    fn process_tagged(&self, tagged: serde_yaml::value::TaggedValue) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        let value = tagged.value;

        trace!("Processing tag '{}' with value {:?}", tag, value);

        match tag.as_str() {
            "!secret" => self.process_secret(value),
            "!env_var" => self.process_env_var(value),
            _ => {
                // Unknown tag, keep it as-is but process the inner value
                let processed = self.process_value(value)?;
                Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                    tag: tagged.tag,
                    value: processed,
                })))
            }
        }
    }

    /// Process !secret tag
    fn process_secret(&self, value: Value) -> ConfigResult<Value> {
        let key = tag_argument("!secret", value)?;
        let secret_value = self.secrets.get(&key)?;
        debug!("Substituted secret: {}", key);
        Ok(Value::String(secret_value.to_string()))
    }

    /// Process !env_var tag
    fn process_env_var(&self, value: Value) -> ConfigResult<Value> {
        let var_name = tag_argument("!env_var", value)?;
        let env_value = std::env::var(&var_name).map_err(|_| ConfigError::EnvVarNotFound {
            var: var_name.clone(),
        })?;

        debug!("Substituted env var: {}", var_name);
        Ok(Value::String(env_value))
    }

    /// Resolve a path relative to the config directory
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

fn tag_argument(tag: &str, value: Value) -> ConfigResult<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(ConfigError::InvalidValue {
            key: tag.to_string(),
            reason: "tag argument must be a string".to_string(),
        }),
    }
}

/// Load a YAML file with tag processing
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(config_dir)?.load_file(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        value.as_mapping().unwrap().get(&Value::String(key.to_string()))
    }

    #[test]
    fn test_load_json_config() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "config.json",
            r#"{"api_url": "http://hass.local:8123/api", "default_hidden": false}"#,
        );

        let value = load_yaml(dir.path(), "config.json").unwrap();
        assert_eq!(
            get(&value, "api_url"),
            Some(&Value::String("http://hass.local:8123/api".to_string()))
        );
        assert_eq!(get(&value, "default_hidden"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_secret_tag() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "hass_password: hunter2\n");
        write_file(dir.path(), "config.yaml", "api_password: !secret hass_password\n");

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(
            get(&value, "api_password"),
            Some(&Value::String("hunter2".to_string()))
        );
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "existing: value\n");
        write_file(dir.path(), "config.yaml", "api_password: !secret nonexistent\n");

        let result = load_yaml(dir.path(), "config.yaml");
        assert!(matches!(result, Err(ConfigError::SecretNotFound { .. })));
    }

    #[test]
    fn test_env_var_tag() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("HA_CUSTOMIZER_TEST_TOKEN", "abc123");
        write_file(
            dir.path(),
            "config.yaml",
            "api_token: !env_var HA_CUSTOMIZER_TEST_TOKEN\n",
        );

        let value = load_yaml(dir.path(), "config.yaml").unwrap();
        assert_eq!(
            get(&value, "api_token"),
            Some(&Value::String("abc123".to_string()))
        );

        std::env::remove_var("HA_CUSTOMIZER_TEST_TOKEN");
    }

    #[test]
    fn test_missing_env_var() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "config.yaml",
            "api_token: !env_var HA_CUSTOMIZER_DEFINITELY_UNSET\n",
        );

        let result = load_yaml(dir.path(), "config.yaml");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "config.yaml", "api_url: [unclosed\n");

        let result = load_yaml(dir.path(), "config.yaml");
        assert!(matches!(result, Err(ConfigError::ParseYaml { .. })));
    }

    #[test]
    fn test_empty_document_is_null() {
        let dir = TempDir::new().unwrap();
        let value = YamlLoader::new(dir.path())
            .unwrap()
            .load_string("\n", Path::new("config.yaml"))
            .unwrap();
        assert!(value.is_null());
    }
}
