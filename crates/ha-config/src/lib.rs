//! Configuration loading for the Home Assistant customizer
//!
//! The configuration file is a flat YAML (or JSON) mapping overlaid on
//! built-in defaults. Two custom tags are understood:
//!
//! - `!secret key` - Substitute from secrets.yaml next to the config file
//! - `!env_var VAR` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use ha_config::CustomizerConfig;
//!
//! let settings = CustomizerConfig::load("config.json")?.resolve()?;
//! println!("reading {}", settings.customize_file.display());
//! ```

mod customizer_config;
mod error;
mod loader;
mod secrets;

pub use customizer_config::{CustomizerConfig, Settings, DEFAULT_API_URL, DEFAULT_CUSTOMIZE_FILE};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, YamlLoader};
pub use secrets::Secrets;

// Re-export serde_yaml::Value for convenience
pub use serde_yaml::Value;
