//! Customizer configuration
//!
//! [`CustomizerConfig`] mirrors the on-disk file: every key is optional and
//! falls back to a built-in default. [`CustomizerConfig::resolve`] validates
//! it and produces the immutable [`Settings`] the rest of the run uses.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Default state API endpoint
pub const DEFAULT_API_URL: &str = "http://localhost:8123/api";

/// Default location of the customize file
pub const DEFAULT_CUSTOMIZE_FILE: &str = "~/.homeassistant/customize.yaml";

/// Suffix appended to the customize file for the default backup path
const BACKUP_SUFFIX: &str = ".backup";

/// Raw configuration as read from the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomizerConfig {
    /// Dry run: no backup, no write, rendered output goes to stderr
    pub debug: bool,

    /// Base URL of the state API (e.g., "http://localhost:8123/api")
    #[serde(deserialize_with = "falsy_string")]
    pub api_url: Option<String>,

    /// Legacy API password, sent as `x-ha-access`
    #[serde(deserialize_with = "falsy_string")]
    pub api_password: Option<String>,

    /// Long-lived access token, sent as a bearer token
    #[serde(deserialize_with = "falsy_string")]
    pub api_token: Option<String>,

    /// Hidden flag used when no entity attribute overrides it
    pub default_hidden: bool,

    /// Attribute stamped on entities new to the customize file
    #[serde(deserialize_with = "falsy_string")]
    pub key_date_added: Option<String>,

    /// Attribute stamped on entities whose customization changed
    #[serde(deserialize_with = "falsy_string")]
    pub key_date_updated: Option<String>,

    /// Customize file to read
    #[serde(deserialize_with = "falsy_string")]
    pub customize_file: Option<String>,

    /// File to write; defaults to `customize_file`
    #[serde(deserialize_with = "falsy_string")]
    pub customize_file_output: Option<String>,

    /// `None` when absent (use the default), `Some(None)` when disabled
    #[serde(deserialize_with = "falsy_setting")]
    pub customize_file_backup: Option<Option<String>>,

    /// Domains the haaska bridge supports
    pub haaska_domains: Vec<String>,

    /// Domains the homebridge bridge supports
    pub homebridge_domains: Vec<String>,

    /// Rewrite single-quoted scalars with double quotes when rendering
    pub double_quote_strings: bool,

    /// Where this configuration came from, for error messages
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

impl Default for CustomizerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            api_url: Some(DEFAULT_API_URL.to_string()),
            api_password: None,
            api_token: None,
            default_hidden: true,
            key_date_added: Some("date_added".to_string()),
            key_date_updated: Some("date_updated".to_string()),
            customize_file: Some(DEFAULT_CUSTOMIZE_FILE.to_string()),
            customize_file_output: None,
            customize_file_backup: None,
            haaska_domains: ha_core::domains::default_haaska_domains(),
            homebridge_domains: ha_core::domains::default_homebridge_domains(),
            double_quote_strings: true,
            origin: None,
        }
    }
}

/// Resolved, validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub debug: bool,
    pub api_url: String,
    pub api_password: Option<String>,
    pub api_token: Option<String>,
    pub default_hidden: bool,
    pub key_date_added: Option<String>,
    pub key_date_updated: Option<String>,
    pub customize_file: PathBuf,
    pub customize_file_output: PathBuf,
    pub customize_file_backup: Option<PathBuf>,
    pub haaska_domains: Vec<String>,
    pub homebridge_domains: Vec<String>,
    pub double_quote_strings: bool,
}

impl CustomizerConfig {
    /// Load configuration from a YAML or JSON file
    ///
    /// `!secret` tags resolve against `secrets.yaml` in the same directory.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().ok_or_else(|| ConfigError::InvalidValue {
            key: "config".to_string(),
            reason: format!("{} is not a file path", path.display()),
        })?;

        let value = load_yaml(dir, file_name)?;
        let mut config = Self::from_yaml(value)?;
        config.origin = Some(path.to_path_buf());
        Ok(config)
    }

    /// Overlay a parsed YAML document onto the defaults
    pub fn from_yaml(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(_) => {
                serde_yaml::from_value(value).map_err(|e| ConfigError::InvalidValue {
                    key: "config".to_string(),
                    reason: e.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                reason: "configuration must be a mapping".to_string(),
            }),
        }
    }

    /// Validate and resolve paths, expanding `~` from `$HOME`
    pub fn resolve(self) -> ConfigResult<Settings> {
        let home = std::env::var("HOME").ok();
        self.resolve_with_home(home.as_deref())
    }

    /// Validate and resolve paths against an explicit home directory
    pub fn resolve_with_home(self, home: Option<&str>) -> ConfigResult<Settings> {
        let api_url = self.required("api_url", self.api_url.clone())?;
        let customize_file = self.required("customize_file", self.customize_file.clone())?;

        let output = self
            .customize_file_output
            .clone()
            .unwrap_or_else(|| customize_file.clone());
        let backup = match self.customize_file_backup.clone() {
            None => Some(format!("{}{}", customize_file, BACKUP_SUFFIX)),
            Some(setting) => setting,
        };

        Ok(Settings {
            debug: self.debug,
            api_url,
            api_password: self.api_password,
            api_token: self.api_token,
            default_hidden: self.default_hidden,
            key_date_added: self.key_date_added,
            key_date_updated: self.key_date_updated,
            customize_file: expand_home(&customize_file, home),
            customize_file_output: expand_home(&output, home),
            customize_file_backup: backup.map(|b| expand_home(&b, home)),
            haaska_domains: self.haaska_domains,
            homebridge_domains: self.homebridge_domains,
            double_quote_strings: self.double_quote_strings,
        })
    }

    fn required(&self, key: &str, value: Option<String>) -> ConfigResult<String> {
        value.ok_or_else(|| ConfigError::MissingParameter {
            key: key.to_string(),
            origin: self
                .origin
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "configuration".to_string()),
        })
    }
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &str, home: Option<&str>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home)) => PathBuf::from(format!("{}{}", home, rest)),
        _ => PathBuf::from(path),
    }
}

/// Interpret a config value as an optional string, where `false`, `null`,
/// `0` and `""` all mean "not set"
fn falsy_to_option(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(format!("expected a string or false, found {:?}", other)),
    }
}

fn falsy_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    falsy_to_option(value).map_err(serde::de::Error::custom)
}

fn falsy_setting<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    falsy_string(deserializer).map(Some)
}
