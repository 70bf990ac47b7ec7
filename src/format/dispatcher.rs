//! Format dispatcher: the public helper operations
//!
//! Every operation validates its primary argument first, then resolves the
//! scope bundle from the rendering context, merges options, fetches a
//! formatter from the cache and formats.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use crate::config::IntlConfig;
use crate::engine::{coerce_instant, BasicEngine, FormatInput, FormatOptions, FormatterFactory, FormatterKind};
use crate::format::cache::FormatterCache;
use crate::format::options::resolve_options;
use crate::scope::{resolve_scope, IntlRef, MessageHandle, MessageNode, ParentData, ScopeBundle};
use crate::template::escape::{escape_hash, SafeString};
use crate::template::value::HelperValue;
use crate::utils::errors::{IntlError, Result};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Locale-aware formatting operations bound to one formatter cache
pub struct IntlHelpers {
    cache: FormatterCache,
    /// Outermost bundle, below every rendering frame
    root: ScopeBundle,
    clock: Clock,
}

impl IntlHelpers {
    /// Helpers using the built-in formatting engine
    pub fn new(config: &IntlConfig) -> Self {
        Self::with_factory(config, Arc::new(BasicEngine))
    }

    /// Helpers building formatters with `factory`
    pub fn with_factory(config: &IntlConfig, factory: Arc<dyn FormatterFactory>) -> Self {
        let root = if config.default_locales.is_empty() {
            ScopeBundle::default()
        } else {
            ScopeBundle::with_locales(config.default_locales.iter().cloned())
        };

        Self {
            cache: FormatterCache::new(factory),
            root,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used when `formatRelative` gets no `now`
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn cache(&self) -> &FormatterCache {
        &self.cache
    }

    /// Effective bundle for a call made inside `scope`
    pub fn resolve_scope(&self, scope: &dyn ParentData) -> ScopeBundle {
        let mut bundle = resolve_scope(scope);
        bundle.fill_from(&self.root);
        bundle
    }

    /// Look up a dotted path (`locales`, `formats.*`, `messages.*`) in the effective bundle
    pub fn intl_get(&self, scope: &dyn ParentData, path: &str) -> Result<HelperValue> {
        let bundle = self.resolve_scope(scope);
        Ok(match bundle.lookup(path)? {
            IntlRef::Locales(tags) => HelperValue::Json(json!(tags)),
            IntlRef::Locale(tag) => HelperValue::Json(Value::String(tag.to_string())),
            IntlRef::Value(value) => HelperValue::Json(value.clone()),
            IntlRef::Formats(formats) => HelperValue::Json(Value::Object(formats.clone())),
            IntlRef::Message(MessageNode::Bound(bound)) => HelperValue::Bound(bound.clone()),
            IntlRef::Message(node) => HelperValue::Json(message_tree_value(node)),
            IntlRef::Messages(messages) => HelperValue::Json(message_group_value(messages)),
        })
    }

    /// `{{formatDate}}`
    pub fn format_date(
        &self,
        scope: &dyn ParentData,
        date: &Value,
        preset: Option<&str>,
        hash: &FormatOptions,
    ) -> Result<String> {
        let instant = require_instant(date, "formatDate")?;
        self.format_instant(scope, FormatterKind::Date, "formatDate", instant, preset, hash)
    }

    /// `{{formatTime}}`
    pub fn format_time(
        &self,
        scope: &dyn ParentData,
        date: &Value,
        preset: Option<&str>,
        hash: &FormatOptions,
    ) -> Result<String> {
        let instant = require_instant(date, "formatTime")?;
        self.format_instant(scope, FormatterKind::Time, "formatTime", instant, preset, hash)
    }

    /// `{{formatRelative}}`; `now` in the hash is the reference instant, the clock otherwise
    pub fn format_relative(
        &self,
        scope: &dyn ParentData,
        date: &Value,
        preset: Option<&str>,
        hash: &FormatOptions,
    ) -> Result<String> {
        let instant = require_instant(date, "formatRelative")?;

        let bundle = self.resolve_scope(scope);
        let locales = required_locales(&bundle, "formatRelative")?;
        let resolved = resolve_options(&bundle, FormatterKind::Relative, preset, hash)?;
        let now = resolved.now.unwrap_or_else(|| (self.clock)());

        let formatter = self.cache.get(FormatterKind::Relative, locales, &resolved.options)?;
        formatter.format(FormatInput::Relative { instant, now })
    }

    /// `{{formatNumber}}`
    pub fn format_number(
        &self,
        scope: &dyn ParentData,
        num: &Value,
        preset: Option<&str>,
        hash: &FormatOptions,
    ) -> Result<String> {
        let value = match num {
            Value::Number(number) => number.as_f64(),
            _ => None,
        }
        .ok_or_else(|| IntlError::invalid_argument("A number must be provided to {{formatNumber}}"))?;

        let bundle = self.resolve_scope(scope);
        let locales = required_locales(&bundle, "formatNumber")?;
        let resolved = resolve_options(&bundle, FormatterKind::Number, preset, hash)?;

        let formatter = self.cache.get(FormatterKind::Number, locales, &resolved.options)?;
        formatter.format(FormatInput::Number(value))
    }

    /// `{{formatMessage}}`
    ///
    /// Without an explicit `message`, a string `intlName` in the hash names
    /// a message under `messages`. An explicit message takes precedence; an
    /// empty template or path counts as no message.
    pub fn format_message(
        &self,
        scope: &dyn ParentData,
        message: Option<MessageHandle>,
        hash: &FormatOptions,
    ) -> Result<String> {
        let message = message.filter(|handle| match handle {
            MessageHandle::Literal(text) | MessageHandle::Reference(text) => !text.is_empty(),
            MessageHandle::Bound(_) => true,
        });
        let handle = match message {
            Some(handle) => handle,
            None => match hash.get("intlName") {
                Some(Value::String(name)) => MessageHandle::Reference(name.clone()),
                _ => {
                    return Err(IntlError::invalid_argument(
                        "{{formatMessage}} must be provided a message or intlName",
                    ))
                }
            },
        };

        // Bound messages skip scope resolution and the cache
        let (bundle, template) = match handle {
            MessageHandle::Bound(bound) => return bound.format(hash),
            MessageHandle::Literal(template) => (self.resolve_scope(scope), template),
            MessageHandle::Reference(path) => {
                let bundle = self.resolve_scope(scope);
                let template = match bundle.lookup_message(&path)? {
                    MessageNode::Template(template) => template.clone(),
                    MessageNode::Bound(bound) => return bound.format(hash),
                    MessageNode::Group(_) => {
                        return Err(IntlError::invalid_argument(format!(
                            "Intl object at {} is a message group, not a message",
                            path
                        )))
                    }
                };
                (bundle, template)
            }
        };

        let locales = required_locales(&bundle, "formatMessage")?;
        let empty = FormatOptions::new();
        let formats = bundle.formats.as_ref().unwrap_or(&empty);
        let formatter = self.cache.get_message(locales, &template, formats)?;
        formatter.format(FormatInput::Message(hash))
    }

    /// `{{formatHTMLMessage}}`: escapes string values of the hash, marks the result safe
    pub fn format_html_message(
        &self,
        scope: &dyn ParentData,
        message: Option<MessageHandle>,
        hash: &FormatOptions,
    ) -> Result<SafeString> {
        let escaped = escape_hash(hash);
        let formatted = self.format_message(scope, message, &escaped)?;
        Ok(SafeString::new(formatted))
    }

    fn format_instant(
        &self,
        scope: &dyn ParentData,
        kind: FormatterKind,
        helper: &str,
        instant: DateTime<Utc>,
        preset: Option<&str>,
        hash: &FormatOptions,
    ) -> Result<String> {
        let bundle = self.resolve_scope(scope);
        let locales = required_locales(&bundle, helper)?;
        let resolved = resolve_options(&bundle, kind, preset, hash)?;

        let formatter = self.cache.get(kind, locales, &resolved.options)?;
        formatter.format(FormatInput::Instant(instant))
    }
}

impl fmt::Debug for IntlHelpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntlHelpers")
            .field("cache", &self.cache)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn require_instant(value: &Value, helper: &str) -> Result<DateTime<Utc>> {
    coerce_instant(value).ok_or_else(|| {
        IntlError::invalid_argument(format!("A date or timestamp must be provided to {{{{{}}}}}", helper))
    })
}

fn required_locales<'a>(bundle: &'a ScopeBundle, helper: &str) -> Result<&'a [String]> {
    bundle
        .locales
        .as_deref()
        .ok_or_else(|| IntlError::MissingLocales { helper: helper.to_string() })
}

/// JSON view of a message subtree; bound messages have no JSON form
fn message_tree_value(node: &MessageNode) -> Value {
    match node {
        MessageNode::Template(template) => Value::String(template.clone()),
        MessageNode::Bound(_) => Value::Null,
        MessageNode::Group(children) => message_group_value(children),
    }
}

fn message_group_value(children: &BTreeMap<String, MessageNode>) -> Value {
    Value::Object(
        children
            .iter()
            .map(|(key, node)| (key.clone(), message_tree_value(node)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::scope::{BoundMessage, ContextStack, Frame};

    fn options(value: Value) -> FormatOptions {
        value.as_object().cloned().unwrap()
    }

    fn helpers() -> IntlHelpers {
        IntlHelpers::new(&IntlConfig::default())
    }

    fn scope(intl: Value) -> ContextStack {
        ContextStack::with_root(Frame::with_intl(json!({}), ScopeBundle::from_value(intl).unwrap()))
    }

    #[test]
    fn test_format_number_with_preset_and_override() {
        let scope = scope(json!({
            "locales": ["en-US"],
            "formats": {"number": {"currency": {"style": "currency", "currency": "USD"}}}
        }));
        let intl = helpers();

        let usd = intl.format_number(&scope, &json!(42), Some("currency"), &FormatOptions::new()).unwrap();
        assert_eq!(usd, "$42.00");
        let eur = intl
            .format_number(&scope, &json!(42), Some("currency"), &options(json!({"currency": "EUR"})))
            .unwrap();
        assert_eq!(eur, "€42.00");
    }

    #[test]
    fn test_invalid_primary_arguments_touch_nothing() {
        let scope = scope(json!({"locales": "en"}));
        let intl = helpers();
        let empty = FormatOptions::new();

        assert_matches!(intl.format_date(&scope, &json!(f64::NAN), None, &empty), Err(IntlError::InvalidArgument(m)) if m.contains("{{formatDate}}"));
        assert_matches!(intl.format_time(&scope, &json!("not a date"), None, &empty), Err(IntlError::InvalidArgument(_)));
        assert_matches!(intl.format_relative(&scope, &json!([]), None, &empty), Err(IntlError::InvalidArgument(_)));
        assert_matches!(intl.format_number(&scope, &json!("42"), None, &empty), Err(IntlError::InvalidArgument(_)));
        assert_eq!(intl.cache().stats(), Default::default());
    }

    #[test]
    fn test_missing_locales_policy() {
        let intl = helpers();
        let empty_scope = ContextStack::new();
        assert_matches!(
            intl.format_number(&empty_scope, &json!(1), None, &FormatOptions::new()),
            Err(IntlError::MissingLocales { helper }) if helper == "formatNumber"
        );

        let config = IntlConfig {
            default_locales: vec!["de".to_string()],
            ..IntlConfig::default()
        };
        let with_root = IntlHelpers::new(&config);
        assert_eq!(with_root.format_number(&empty_scope, &json!(1234.5), None, &FormatOptions::new()).unwrap(), "1.234,5");
    }

    #[test]
    fn test_format_relative_uses_now_from_hash_or_clock() {
        let scope = scope(json!({"locales": ["en"]}));
        let now = coerce_instant(&json!("2024-06-01T12:00:00Z")).unwrap();
        let intl = helpers().with_clock(move || now);

        let from_hash = intl
            .format_relative(&scope, &json!("2024-06-01T09:00:00Z"), None, &options(json!({"now": "2024-06-01T10:00:00Z"})))
            .unwrap();
        assert_eq!(from_hash, "1 hour ago");

        let from_clock = intl.format_relative(&scope, &json!("2024-06-01T09:00:00Z"), None, &FormatOptions::new()).unwrap();
        assert_eq!(from_clock, "3 hours ago");
        // both calls share one formatter: `now` is not part of its options
        assert_eq!(intl.cache().len(), 1);
    }

    #[test]
    fn test_format_message_sources() {
        let scope = scope(json!({
            "locales": ["en"],
            "messages": {"greeting": {"hello": "Hello {name}"}, "group": {"x": "y"}}
        }));
        let intl = helpers();
        let hash = options(json!({"name": "Ana"}));

        let literal = intl.format_message(&scope, Some(MessageHandle::Literal("Hi {name}".into())), &hash).unwrap();
        assert_eq!(literal, "Hi Ana");

        let reference = intl
            .format_message(&scope, Some(MessageHandle::Reference("greeting.hello".into())), &hash)
            .unwrap();
        assert_eq!(reference, "Hello Ana");

        let by_name = intl
            .format_message(&scope, None, &options(json!({"intlName": "greeting.hello", "name": "Bo"})))
            .unwrap();
        assert_eq!(by_name, "Hello Bo");

        let empty_literal = intl
            .format_message(
                &scope,
                Some(MessageHandle::Literal(String::new())),
                &options(json!({"intlName": "greeting.hello", "name": "Di"})),
            )
            .unwrap();
        assert_eq!(empty_literal, "Hello Di");
        assert_matches!(
            intl.format_message(&scope, Some(MessageHandle::Literal(String::new())), &hash),
            Err(IntlError::InvalidArgument(_))
        );

        assert_matches!(
            intl.format_message(&scope, None, &options(json!({"intlName": "greeting.missing"}))),
            Err(IntlError::ReferenceNotFound { path }) if path == "greeting.missing"
        );
        assert_matches!(intl.format_message(&scope, None, &hash), Err(IntlError::InvalidArgument(_)));
        assert_matches!(
            intl.format_message(&scope, Some(MessageHandle::Reference("group".into())), &hash),
            Err(IntlError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_bound_messages_bypass_cache_and_scope() {
        let intl = helpers();
        let formatter = BasicEngine
            .build_message(&["en".to_string()], "Bound {name}", &FormatOptions::new())
            .unwrap();
        let bound = BoundMessage::new(formatter).unwrap();

        let out = intl
            .format_message(&ContextStack::new(), Some(MessageHandle::Bound(bound)), &options(json!({"name": "Cy"})))
            .unwrap();
        assert_eq!(out, "Bound Cy");
        assert!(intl.cache().is_empty());
    }

    #[test]
    fn test_html_message_escapes_values_not_template() {
        let scope = scope(json!({"locales": ["en"]}));
        let intl = helpers();
        let safe = intl
            .format_html_message(
                &scope,
                Some(MessageHandle::Literal("<p>Hello {name}</p>".into())),
                &options(json!({"name": "<b>", "count": 3})),
            )
            .unwrap();
        assert_eq!(safe.as_str(), "<p>Hello &lt;b&gt;</p>");
    }

    #[test]
    fn test_intl_get() {
        let mut stack = scope(json!({
            "locales": ["en"],
            "formats": {"date": {"short": {"month": "short"}}},
            "messages": {"a": {"b": "B"}}
        }));
        stack.push(Frame::with_intl(json!({}), ScopeBundle::with_locales(["fr-FR"])));
        let intl = helpers();

        assert_matches!(intl.intl_get(&stack, "locales"), Ok(HelperValue::Json(v)) if v == json!(["fr-FR"]));
        assert_matches!(intl.intl_get(&stack, "formats.date.short.month"), Ok(HelperValue::Json(v)) if v == "short");
        assert_matches!(intl.intl_get(&stack, "messages.a"), Ok(HelperValue::Json(v)) if v == json!({"b": "B"}));
        assert_matches!(intl.intl_get(&stack, "messages.a.c"), Err(IntlError::ReferenceNotFound { path }) if path == "messages.a.c");
    }
}
