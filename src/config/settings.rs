//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub intl: IntlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locale data configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IntlConfig {
    /// Directory holding `<locale>.json` scope data files
    pub data_dir: String,
    /// Root-level locales, used only when no rendering frame supplies any
    pub default_locales: Vec<String>,
    /// Locales the data store loads; empty means "whatever is requested"
    pub supported_locales: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("TEMPLATE_INTL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("intl.default_locales")
                    .with_list_parse_key("intl.supported_locales")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Parse settings from a TOML document
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::IntlError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            intl: IntlConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IntlConfig {
    fn default() -> Self {
        Self {
            data_dir: "locales".to_string(),
            default_locales: vec![],
            supported_locales: vec!["en".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: "logs".to_string(),
        }
    }
}
