//! Builders for frames, scopes and option hashes

use serde_json::{json, Value};
use template_intl::config::IntlConfig;
use template_intl::{ContextStack, FormatOptions, Frame, ScopeBundle};

/// Frame contributing the `intl` bundle described by `intl`
pub fn intl_frame(intl: Value) -> Frame {
    Frame::with_intl(json!({}), ScopeBundle::from_value(intl).expect("valid test bundle"))
}

/// Context chain from root to innermost
pub fn stack(frames: Vec<Frame>) -> ContextStack {
    frames.into_iter().collect()
}

/// Single-frame scope
pub fn scope(intl: Value) -> ContextStack {
    stack(vec![intl_frame(intl)])
}

/// Option hash from a JSON object literal
pub fn options(value: Value) -> FormatOptions {
    value.as_object().cloned().expect("options must be a JSON object")
}

pub fn no_options() -> FormatOptions {
    FormatOptions::new()
}

pub fn test_config() -> IntlConfig {
    IntlConfig {
        data_dir: "locales".to_string(),
        default_locales: vec![],
        supported_locales: vec!["en".to_string()],
    }
}

/// Locale data file for English
pub fn english_locale_data() -> Value {
    json!({
        "formats": {
            "number": {"currency": {"style": "currency", "currency": "USD"}},
            "date": {"long": {"weekday": "long", "year": "numeric", "month": "long", "day": "numeric"}}
        },
        "messages": {
            "greeting": {"hello": "Hello {name}!"},
            "inbox": "You have {count, plural, =0 {no messages} one {# message} other {# messages}}."
        }
    })
}

/// Locale data file for French
pub fn french_locale_data() -> Value {
    json!({
        "formats": {
            "number": {"currency": {"style": "currency", "currency": "EUR"}}
        },
        "messages": {
            "greeting": {"hello": "Bonjour {name} !"},
            "inbox": "Vous avez {count, plural, =0 {aucun message} one {# message} other {# messages}}."
        }
    })
}
