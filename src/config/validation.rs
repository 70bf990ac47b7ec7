//! Configuration validation module
//!
//! This module provides validation functions for configuration
//! to ensure locale settings are usable before any helper runs.

use crate::engine::locale::is_well_formed_tag;
use crate::utils::errors::{IntlError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_intl_config(&settings.intl)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate locale data configuration
fn validate_intl_config(config: &super::IntlConfig) -> Result<()> {
    if config.data_dir.is_empty() {
        return Err(IntlError::Config(
            "Locale data directory is required".to_string()
        ));
    }

    for tag in config.default_locales.iter().chain(config.supported_locales.iter()) {
        if !is_well_formed_tag(tag) {
            return Err(IntlError::Config(
                format!("Invalid locale tag: {:?}", tag)
            ));
        }
    }

    if !config.supported_locales.is_empty() {
        if let Some(missing) = config
            .default_locales
            .iter()
            .find(|tag| !config.supported_locales.contains(tag))
        {
            return Err(IntlError::Config(
                format!("Default locale {} must be in supported locales list", missing)
            ));
        }
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(IntlError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(IntlError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_malformed_locale() {
        let mut settings = Settings::default();
        settings.intl.supported_locales.push("not a tag".to_string());
        assert_matches!(validate_settings(&settings), Err(IntlError::Config(_)));
    }

    #[test]
    fn test_default_locale_must_be_supported() {
        let mut settings = Settings::default();
        settings.intl.default_locales = vec!["de".to_string()];
        assert_matches!(validate_settings(&settings), Err(IntlError::Config(msg)) if msg.contains("de"));

        settings.intl.supported_locales.clear();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
