//! HTML escaping and pre-escaped strings

use std::borrow::Cow;
use std::fmt;
use serde_json::Value;
use crate::engine::FormatOptions;

/// String that the host must emit verbatim
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeString(String);

impl SafeString {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SafeString> for String {
    fn from(safe: SafeString) -> Self {
        safe.0
    }
}

fn is_special(c: char) -> bool {
    matches!(c, '&' | '<' | '>' | '"' | '\'' | '`')
}

/// Escape `& < > " ' \`` for HTML text and attribute contexts
pub fn escape_expression(text: &str) -> Cow<'_, str> {
    if !text.contains(is_special) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '`' => escaped.push_str("&#x60;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Copy of `hash` with every string value escaped; other values are untouched
pub fn escape_hash(hash: &FormatOptions) -> FormatOptions {
    hash.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => Value::String(escape_expression(text).into_owned()),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_escape_expression() {
        assert_eq!(escape_expression(r#"<a href="x">'&'</a> `"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt; &#x60;");
        assert!(matches!(escape_expression("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_hash_only_touches_strings() {
        let hash = json!({"name": "<b>", "count": 3, "flag": true}).as_object().cloned().unwrap();
        let escaped = escape_hash(&hash);
        assert_eq!(escaped["name"], "&lt;b&gt;");
        assert_eq!(escaped["count"], 3);
        assert_eq!(escaped["flag"], true);
        // caller's hash is left as it was
        assert_eq!(hash["name"], "<b>");
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_markup(text in ".*") {
            let escaped = escape_expression(&text);
            prop_assert!(!escaped.contains(|c: char| matches!(c, '<' | '>' | '"' | '\'' | '`')));
            prop_assert!(escaped.len() >= text.len());
        }
    }
}
