//! Settings loading, validation and logging setup

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use template_intl::config::LoggingConfig;
use template_intl::utils::logging::init_logging;
use template_intl::{IntlError, IntlHelpers, Settings};

const ENV_KEYS: [&str; 3] = [
    "TEMPLATE_INTL__INTL__DATA_DIR",
    "TEMPLATE_INTL__INTL__DEFAULT_LOCALES",
    "TEMPLATE_INTL__LOGGING__LEVEL",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_settings_from_environment() {
    clear_env();
    std::env::set_var("TEMPLATE_INTL__INTL__DATA_DIR", "/srv/intl");
    std::env::set_var("TEMPLATE_INTL__INTL__DEFAULT_LOCALES", "en,fr");
    std::env::set_var("TEMPLATE_INTL__LOGGING__LEVEL", "debug");

    let settings = Settings::new();
    clear_env();
    let settings = settings.unwrap();

    assert_eq!(settings.intl.data_dir, "/srv/intl");
    assert_eq!(settings.intl.default_locales, vec!["en", "fr"]);
    assert_eq!(settings.logging.level, "debug");
}

#[test]
#[serial]
fn test_defaults_without_sources() {
    clear_env();
    let settings = Settings::new().unwrap();
    assert_eq!(settings.intl.data_dir, "locales");
    assert!(settings.intl.default_locales.is_empty());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_validation_rejects_unsupported_default() {
    let settings = Settings::from_toml(
        r#"
        [intl]
        default_locales = ["de"]
        supported_locales = ["en", "fr"]
        "#,
    )
    .unwrap();
    assert_matches!(settings.validate(), Err(IntlError::Config(message)) if message.contains("de"));
}

#[test]
fn test_configured_root_locales_apply_to_bare_scopes() {
    let settings = Settings::from_toml(
        r#"
        [intl]
        default_locales = ["fr"]
        supported_locales = ["fr"]
        "#,
    )
    .unwrap();
    settings.validate().unwrap();

    let intl = IntlHelpers::new(&settings.intl);
    let out = intl
        .format_number(&stack(vec![]), &serde_json::json!(0.5), None, &options(serde_json::json!({"style": "percent"})))
        .unwrap();
    assert!(out.starts_with("50") && out.ends_with('%') && out != "50%", "{}", out);
}

#[test]
#[serial]
fn test_init_logging_installs_once() {
    let dir = TestDataDir::new_without_logging().unwrap();
    let config = LoggingConfig {
        level: "debug".to_string(),
        file_path: dir.path_string(),
    };

    let guard = init_logging(&config).unwrap();
    tracing::info!("logging to file");
    assert_matches!(init_logging(&config), Err(IntlError::Config(_)));
    drop(guard);
}
