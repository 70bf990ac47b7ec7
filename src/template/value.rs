//! Values passed to and returned from helpers

use std::borrow::Cow;
use serde_json::Value;
use crate::scope::{BoundMessage, MessageHandle};
use crate::template::escape::{escape_expression, SafeString};

/// A helper argument or result
#[derive(Debug, Clone)]
pub enum HelperValue {
    /// Plain template data
    Json(Value),
    /// A compiled message, as produced by `intlGet` on a bound entry
    Bound(BoundMessage),
    /// Pre-escaped HTML
    Safe(SafeString),
}

impl HelperValue {
    /// Text the host writes into the output; plain values are HTML-escaped
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            HelperValue::Safe(safe) => Cow::Borrowed(safe.as_str()),
            HelperValue::Json(Value::String(text)) => escape_expression(text),
            HelperValue::Json(Value::Null) => Cow::Borrowed(""),
            HelperValue::Json(other) => Cow::Owned(escape_expression(&other.to_string()).into_owned()),
            HelperValue::Bound(_) => Cow::Borrowed(""),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            HelperValue::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Interpret as the `message` argument of `formatMessage`
    ///
    /// Strings are literal templates; bound messages pass through.
    pub fn as_message(&self) -> Option<MessageHandle> {
        match self {
            HelperValue::Json(Value::String(template)) => Some(MessageHandle::Literal(template.clone())),
            HelperValue::Safe(safe) => Some(MessageHandle::Literal(safe.as_str().to_string())),
            HelperValue::Bound(bound) => Some(MessageHandle::Bound(bound.clone())),
            HelperValue::Json(_) => None,
        }
    }
}

impl From<Value> for HelperValue {
    fn from(value: Value) -> Self {
        HelperValue::Json(value)
    }
}

impl From<String> for HelperValue {
    fn from(text: String) -> Self {
        HelperValue::Json(Value::String(text))
    }
}

impl From<SafeString> for HelperValue {
    fn from(safe: SafeString) -> Self {
        HelperValue::Safe(safe)
    }
}

impl From<BoundMessage> for HelperValue {
    fn from(bound: BoundMessage) -> Self {
        HelperValue::Bound(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_escapes_plain_values_only() {
        assert_eq!(HelperValue::from("<i>x</i>".to_string()).render(), "&lt;i&gt;x&lt;/i&gt;");
        assert_eq!(HelperValue::from(SafeString::new("<i>x</i>")).render(), "<i>x</i>");
        assert_eq!(HelperValue::from(json!(12.5)).render(), "12.5");
        assert_eq!(HelperValue::from(Value::Null).render(), "");
    }

    #[test]
    fn test_as_message() {
        assert!(matches!(
            HelperValue::from("Hi {name}".to_string()).as_message(),
            Some(MessageHandle::Literal(t)) if t == "Hi {name}"
        ));
        assert!(HelperValue::from(json!(3)).as_message().is_none());
    }
}
