//! Scope bundles: the `{locales, formats, messages}` data a helper call sees

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use crate::engine::{FormatInput, FormatOptions, Formatter, FormatterKind};
use crate::utils::errors::{IntlError, Result};

/// Locale data a rendering frame (or a merge of frames) provides
///
/// Each field is independent: a frame that sets only `messages` leaves
/// `locales` and `formats` to outer frames.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeBundle {
    #[serde(default, deserialize_with = "locales_from_str_or_seq")]
    pub locales: Option<Vec<String>>,
    #[serde(default)]
    pub formats: Option<Map<String, Value>>,
    #[serde(default)]
    pub messages: Option<BTreeMap<String, MessageNode>>,
}

/// A node of the `messages` tree
#[derive(Clone)]
pub enum MessageNode {
    /// Raw message template
    Template(String),
    /// Message already compiled into a formatter
    Bound(BoundMessage),
    /// Nested group, addressed by dotted paths
    Group(BTreeMap<String, MessageNode>),
}

/// A message formatter captured together with its instance
///
/// Formatting a bound message skips scope resolution and the formatter cache.
#[derive(Clone)]
pub struct BoundMessage {
    formatter: Arc<dyn Formatter>,
}

/// How a caller names the message to format
#[derive(Debug, Clone)]
pub enum MessageHandle {
    /// A literal message template
    Literal(String),
    /// A dotted path under `messages`
    Reference(String),
    /// A pre-built message formatter
    Bound(BoundMessage),
}

/// Borrowed result of a dotted-path lookup
#[derive(Debug, Clone, Copy)]
pub enum IntlRef<'a> {
    Locales(&'a [String]),
    Locale(&'a str),
    Value(&'a Value),
    Message(&'a MessageNode),
    Messages(&'a BTreeMap<String, MessageNode>),
    Formats(&'a Map<String, Value>),
}

impl ScopeBundle {
    /// Bundle carrying only a locale list
    pub fn with_locales<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locales: Some(locales.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Parse a bundle from JSON (`{"locales": ..., "formats": ..., "messages": ...}`)
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Builder-style setter for `formats`
    pub fn formats(mut self, formats: Value) -> Result<Self> {
        self.formats = Some(serde_json::from_value(formats)?);
        Ok(self)
    }

    /// Builder-style setter for `messages`
    pub fn messages(mut self, messages: Value) -> Result<Self> {
        self.messages = Some(serde_json::from_value(messages)?);
        Ok(self)
    }

    /// Add or replace one message at a dotted path, creating groups on the way
    pub fn insert_message(&mut self, path: &str, node: MessageNode) -> Result<()> {
        let segments = split_path(path)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| IntlError::reference_not_found(path))?;

        let mut group = self.messages.get_or_insert_with(BTreeMap::new);
        for segment in parents {
            let entry = group
                .entry((*segment).to_string())
                .or_insert_with(|| MessageNode::Group(BTreeMap::new()));
            group = match entry {
                MessageNode::Group(children) => children,
                _ => {
                    return Err(IntlError::invalid_argument(format!(
                        "cannot nest message {} under a non-group entry",
                        path
                    )))
                }
            };
        }
        group.insert((*last).to_string(), node);
        Ok(())
    }

    /// True when no field is defined
    pub fn is_empty(&self) -> bool {
        self.locales.is_none() && self.formats.is_none() && self.messages.is_none()
    }

    /// Fill every undefined field from `outer`; defined fields are kept wholesale
    pub fn fill_from(&mut self, outer: &ScopeBundle) {
        if self.locales.is_none() {
            self.locales = outer.locales.clone();
        }
        if self.formats.is_none() {
            self.formats = outer.formats.clone();
        }
        if self.messages.is_none() {
            self.messages = outer.messages.clone();
        }
    }

    /// Resolve a dotted path from the bundle root (`locales`, `formats.*`, `messages.*`)
    pub fn lookup(&self, path: &str) -> Result<IntlRef<'_>> {
        let not_found = || IntlError::reference_not_found(path);
        let segments = split_path(path)?;
        let (root, rest) = segments.split_first().ok_or_else(not_found)?;

        match *root {
            "locales" => {
                let locales = self.locales.as_deref().ok_or_else(not_found)?;
                match rest {
                    [] => Ok(IntlRef::Locales(locales)),
                    [index] => index
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| locales.get(i))
                        .map(|tag| IntlRef::Locale(tag.as_str()))
                        .ok_or_else(not_found),
                    _ => Err(not_found()),
                }
            }
            "formats" => {
                let formats = self.formats.as_ref().ok_or_else(not_found)?;
                match rest.split_first() {
                    None => Ok(IntlRef::Formats(formats)),
                    Some((first, tail)) => {
                        let start = formats.get(*first).ok_or_else(not_found)?;
                        walk_value(start, tail).map(IntlRef::Value).ok_or_else(not_found)
                    }
                }
            }
            "messages" => {
                let messages = self.messages.as_ref().ok_or_else(not_found)?;
                if rest.is_empty() {
                    return Ok(IntlRef::Messages(messages));
                }
                walk_messages(messages, rest).map(IntlRef::Message).ok_or_else(not_found)
            }
            _ => Err(not_found()),
        }
    }

    /// Resolve a message path relative to `messages`; errors name `path` as given
    pub fn lookup_message(&self, path: &str) -> Result<&MessageNode> {
        let segments = split_path(path)?;
        self.messages
            .as_ref()
            .and_then(|messages| walk_messages(messages, &segments))
            .ok_or_else(|| IntlError::reference_not_found(path))
    }

    /// Resolve the preset `formats.<kind>.<name>` as an options object
    pub fn lookup_preset(&self, kind: FormatterKind, name: &str) -> Result<&FormatOptions> {
        let path = format!("formats.{}.{}", kind, name);
        match self.lookup(&path)? {
            IntlRef::Value(Value::Object(options)) => Ok(options),
            _ => Err(IntlError::invalid_argument(format!(
                "Intl object at {} is not a format options object",
                path
            ))),
        }
    }
}

/// Split `a.b.c` into segments; empty segments never resolve
fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(IntlError::reference_not_found(path));
    }
    Ok(segments)
}

fn walk_value<'a>(start: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = start;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn walk_messages<'a>(messages: &'a BTreeMap<String, MessageNode>, segments: &[&str]) -> Option<&'a MessageNode> {
    let (first, rest) = segments.split_first()?;
    let mut current = messages.get(*first)?;
    for segment in rest {
        current = match current {
            MessageNode::Group(children) => children.get(*segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn locales_from_str_or_seq<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(tag)) => Some(vec![tag]),
        Some(OneOrMany::Many(tags)) => Some(tags),
    })
}

impl MessageNode {
    /// Build a node tree from JSON: strings are templates, objects are groups
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::String(template) => Ok(MessageNode::Template(template)),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, child)| MessageNode::from_value(child).map(|node| (key, node)))
                .collect::<std::result::Result<BTreeMap<_, _>, _>>()
                .map(MessageNode::Group),
            other => Err(format!("message entries must be strings or objects, got {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for MessageNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        MessageNode::from_value(value).map_err(de::Error::custom)
    }
}

impl fmt::Debug for MessageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageNode::Template(template) => f.debug_tuple("Template").field(template).finish(),
            MessageNode::Bound(bound) => f.debug_tuple("Bound").field(bound).finish(),
            MessageNode::Group(children) => f.debug_map().entries(children.iter()).finish(),
        }
    }
}

impl From<&str> for MessageNode {
    fn from(template: &str) -> Self {
        MessageNode::Template(template.to_string())
    }
}

impl From<BoundMessage> for MessageNode {
    fn from(bound: BoundMessage) -> Self {
        MessageNode::Bound(bound)
    }
}

impl BoundMessage {
    /// Capture a message formatter
    pub fn new(formatter: Arc<dyn Formatter>) -> Result<Self> {
        if formatter.kind() != FormatterKind::Message {
            return Err(IntlError::invalid_argument(format!(
                "only message formatters can be bound, got a {} formatter",
                formatter.kind()
            )));
        }
        Ok(Self { formatter })
    }

    /// Format with the call-site values
    pub fn format(&self, values: &FormatOptions) -> Result<String> {
        self.formatter.format(FormatInput::Message(values))
    }

    /// Whether both handles capture the same formatter instance
    pub fn ptr_eq(&self, other: &BoundMessage) -> bool {
        Arc::ptr_eq(&self.formatter, &other.formatter)
    }
}

impl fmt::Debug for BoundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundMessage({:p})", Arc::as_ptr(&self.formatter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use crate::engine::{BasicEngine, FormatterFactory};

    fn bundle() -> ScopeBundle {
        ScopeBundle::from_value(json!({
            "locales": "en-US",
            "formats": {"number": {"usd": {"style": "currency", "currency": "USD"}}},
            "messages": {"greeting": {"hello": "Hello {name}"}, "bye": "Bye"}
        }))
        .unwrap()
    }

    #[test]
    fn test_single_locale_string_becomes_list() {
        assert_eq!(bundle().locales, Some(vec!["en-US".to_string()]));
    }

    #[test]
    fn test_lookup_from_root() {
        let bundle = bundle();
        assert_matches!(bundle.lookup("locales"), Ok(IntlRef::Locales(tags)) if tags == ["en-US"]);
        assert_matches!(bundle.lookup("locales.0"), Ok(IntlRef::Locale("en-US")));
        assert_matches!(bundle.lookup("formats.number.usd.currency"), Ok(IntlRef::Value(v)) if v == "USD");
        assert_matches!(bundle.lookup("messages.greeting.hello"), Ok(IntlRef::Message(MessageNode::Template(t))) if t == "Hello {name}");
        assert_matches!(bundle.lookup("messages"), Ok(IntlRef::Messages(_)));
    }

    #[test]
    fn test_lookup_failures_name_the_full_path() {
        let bundle = bundle();
        for path in ["formats.number.eur", "messages.greeting.hello.deeper", "missing", "formats..usd", ""] {
            let err = bundle.lookup(path).unwrap_err();
            assert_matches!(&err, IntlError::ReferenceNotFound { path: p } if p == path);
        }
    }

    #[test]
    fn test_lookup_message_is_relative_to_messages() {
        let bundle = bundle();
        assert_matches!(bundle.lookup_message("bye"), Ok(MessageNode::Template(t)) if t == "Bye");
        assert_matches!(
            bundle.lookup_message("greeting.missing"),
            Err(IntlError::ReferenceNotFound { path }) if path == "greeting.missing"
        );
        assert!(ScopeBundle::default().lookup_message("bye").is_err());
    }

    #[test]
    fn test_lookup_preset() {
        let bundle = bundle();
        assert_eq!(bundle.lookup_preset(FormatterKind::Number, "usd").unwrap()["currency"], "USD");
        assert_matches!(
            bundle.lookup_preset(FormatterKind::Date, "usd"),
            Err(IntlError::ReferenceNotFound { path }) if path == "formats.date.usd"
        );
    }

    #[test]
    fn test_fill_from_overrides_per_field() {
        let mut inner = ScopeBundle::with_locales(["fr"]);
        inner.fill_from(&bundle());
        assert_eq!(inner.locales, Some(vec!["fr".to_string()]));
        assert!(inner.formats.is_some());
        assert!(inner.messages.is_some());
    }

    #[test]
    fn test_insert_message_creates_groups() {
        let mut bundle = ScopeBundle::default();
        bundle.insert_message("emails.welcome.subject", "Welcome!".into()).unwrap();
        assert_matches!(bundle.lookup_message("emails.welcome.subject"), Ok(MessageNode::Template(_)));
        assert!(bundle.insert_message("emails.welcome.subject.x", "nope".into()).is_err());
    }

    #[test]
    fn test_rejects_non_string_messages() {
        assert!(ScopeBundle::from_value(json!({"messages": {"count": 3}})).is_err());
    }

    #[test]
    fn test_bound_message_formats_directly() {
        let formatter = BasicEngine
            .build_message(&["en".to_string()], "Hi {name}", &FormatOptions::new())
            .unwrap();
        let bound = BoundMessage::new(formatter).unwrap();
        let values = json!({"name": "Lin"}).as_object().cloned().unwrap();
        assert_eq!(bound.format(&values).unwrap(), "Hi Lin");

        let number = BasicEngine
            .build(FormatterKind::Number, &["en".to_string()], &FormatOptions::new())
            .unwrap();
        assert!(BoundMessage::new(number).is_err());
    }
}
