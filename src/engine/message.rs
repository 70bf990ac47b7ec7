//! ICU-style message formatting
//!
//! Supported argument forms:
//!
//! - `{name}`
//! - `{name, number}` / `{name, number, style}` (`integer`, `percent`, or a preset in `formats.number`)
//! - `{name, date, style}` / `{name, time, style}` (`short`, `medium`, `long`, `full`, or a preset)
//! - `{name, plural, [offset:N] =0 {...} one {...} other {...}}` with `#`
//! - `{name, selectordinal, one {#st} two {#nd} few {#rd} other {#th}}`
//! - `{name, select, male {...} other {...}}`
//!
//! The template is parsed and every nested number/date formatter is built
//! when the message formatter is constructed, so a malformed template is a
//! construction error rather than a per-call one. One locale is negotiated
//! per message and shared by its plural rules and nested formatters.

use icu::locale::Locale;
use serde_json::{json, Map, Value};
use crate::engine::datetime::{coerce_instant, DateTimeFormatter};
use crate::engine::locale::resolve_locale;
use crate::engine::number::NumberFormatter;
use crate::engine::plural::{PluralSelector, PluralType};
use crate::engine::{unsupported_input, FormatInput, FormatOptions, Formatter, FormatterKind};
use crate::utils::errors::{IntlError, Result};

const KIND: FormatterKind = FormatterKind::Message;

#[derive(Debug)]
enum Part {
    Text(String),
    Pound,
    Simple(String),
    Number { name: String, formatter: NumberFormatter },
    Instant { name: String, formatter: DateTimeFormatter },
    Plural { name: String, plural_type: PluralType, offset: f64, cases: Vec<(PluralKey, Vec<Part>)> },
    Select { name: String, cases: Vec<(String, Vec<Part>)> },
}

#[derive(Debug, PartialEq)]
enum PluralKey {
    Exact(f64),
    Category(String),
}

/// A compiled message template bound to its locales
#[derive(Debug)]
pub struct MessageFormatter {
    parts: Vec<Part>,
    cardinal: PluralSelector,
    /// Only built when the template uses `selectordinal`
    ordinal: Option<PluralSelector>,
    pound: NumberFormatter,
}

impl MessageFormatter {
    pub fn new(locales: &[String], template: &str, formats: &FormatOptions) -> Result<Self> {
        let locale = resolve_locale(KIND, locales)?;

        let mut parser = Parser {
            chars: template.chars().collect(),
            pos: 0,
            locale: &locale,
            formats,
            uses_ordinal: false,
        };
        let parts = parser.parse_parts(false)?;
        if parser.pos < parser.chars.len() {
            return Err(parser.error("unmatched '}'"));
        }
        let ordinal = if parser.uses_ordinal {
            Some(PluralSelector::new(KIND, &locale, PluralType::Ordinal)?)
        } else {
            None
        };

        Ok(Self {
            parts,
            cardinal: PluralSelector::new(KIND, &locale, PluralType::Cardinal)?,
            ordinal,
            pound: NumberFormatter::with_locale(locale, &FormatOptions::new())?,
        })
    }

    fn selector(&self, plural_type: PluralType) -> &PluralSelector {
        match (plural_type, &self.ordinal) {
            (PluralType::Ordinal, Some(ordinal)) => ordinal,
            _ => &self.cardinal,
        }
    }

    /// Format the message with `values` substituted for its arguments
    pub fn format_values(&self, values: &FormatOptions) -> Result<String> {
        let mut out = String::new();
        self.render(&self.parts, values, None, &mut out)?;
        Ok(out)
    }

    fn render(&self, parts: &[Part], values: &FormatOptions, pound: Option<f64>, out: &mut String) -> Result<()> {
        for part in parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Pound => match pound {
                    Some(n) => out.push_str(&self.pound.format_number(n)),
                    None => out.push('#'),
                },
                Part::Simple(name) => match require(values, name)? {
                    Value::String(s) => out.push_str(s),
                    other => out.push_str(&other.to_string()),
                },
                Part::Number { name, formatter } => {
                    out.push_str(&formatter.format_number(require_number(values, name)?));
                }
                Part::Instant { name, formatter } => {
                    let instant = coerce_instant(require(values, name)?).ok_or_else(|| {
                        IntlError::MessageFormat(format!("Value for {} must be a date or timestamp", name))
                    })?;
                    out.push_str(&formatter.format_instant(instant)?);
                }
                Part::Plural { name, plural_type, offset, cases } => {
                    let n = require_number(values, name)?;
                    let category = self.selector(*plural_type).category(n - offset);
                    let chosen = cases
                        .iter()
                        .find(|(key, _)| *key == PluralKey::Exact(n))
                        .or_else(|| cases.iter().find(|(key, _)| matches!(key, PluralKey::Category(c) if c == category)))
                        .or_else(|| cases.iter().find(|(key, _)| matches!(key, PluralKey::Category(c) if c == "other")));
                    if let Some((_, sub)) = chosen {
                        self.render(sub, values, Some(n - offset), out)?;
                    }
                }
                Part::Select { name, cases } => {
                    let key = match require(values, name)? {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let chosen = cases
                        .iter()
                        .find(|(case, _)| *case == key)
                        .or_else(|| cases.iter().find(|(case, _)| case == "other"));
                    if let Some((_, sub)) = chosen {
                        self.render(sub, values, pound, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Formatter for MessageFormatter {
    fn kind(&self) -> FormatterKind {
        KIND
    }

    fn format(&self, input: FormatInput<'_>) -> Result<String> {
        match input {
            FormatInput::Message(values) => self.format_values(values),
            other => Err(unsupported_input(KIND, &other)),
        }
    }
}

fn require<'a>(values: &'a FormatOptions, name: &str) -> Result<&'a Value> {
    values
        .get(name)
        .ok_or_else(|| IntlError::MessageFormat(format!("A value must be provided for: {}", name)))
}

fn require_number(values: &FormatOptions, name: &str) -> Result<f64> {
    require(values, name)?
        .as_f64()
        .ok_or_else(|| IntlError::MessageFormat(format!("Value for {} must be a number", name)))
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    locale: &'a Locale,
    formats: &'a FormatOptions,
    uses_ordinal: bool,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> IntlError {
        IntlError::construction(KIND, format!("{} at offset {}", reason, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    /// Read up to (not including) any of `stops`, trimmed
    fn read_until(&mut self, stops: &[char]) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !stops.contains(&c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect::<String>().trim().to_string()
    }

    /// Parse message text until end of input or an unconsumed closing '}'
    fn parse_parts(&mut self, in_plural: bool) -> Result<Vec<Part>> {
        let mut parts = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            match c {
                '}' => break,
                '{' => {
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    self.pos += 1;
                    parts.push(self.parse_argument(in_plural)?);
                }
                '#' if in_plural => {
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    self.pos += 1;
                    parts.push(Part::Pound);
                }
                '\'' => self.parse_quoted(in_plural, &mut text),
                _ => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        if !text.is_empty() {
            parts.push(Part::Text(text));
        }
        Ok(parts)
    }

    fn parse_quoted(&mut self, in_plural: bool, text: &mut String) {
        self.pos += 1;
        match self.peek() {
            Some('\'') => {
                text.push('\'');
                self.pos += 1;
            }
            Some('{') | Some('}') => self.read_literal(text),
            Some('#') if in_plural => self.read_literal(text),
            _ => text.push('\''),
        }
    }

    fn read_literal(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\'' {
                if self.peek() == Some('\'') {
                    text.push('\'');
                    self.pos += 1;
                } else {
                    return;
                }
            } else {
                text.push(c);
            }
        }
    }

    fn parse_argument(&mut self, in_plural: bool) -> Result<Part> {
        let name = self.read_until(&[',', '}']);
        if name.is_empty() {
            return Err(self.error("empty argument name"));
        }
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Part::Simple(name));
        }
        self.expect(',')?;

        let kind = self.read_until(&[',', '}']);
        match kind.as_str() {
            "number" | "date" | "time" => {
                let style = if self.peek() == Some(',') {
                    self.pos += 1;
                    Some(self.read_until(&['}']))
                } else {
                    None
                };
                self.expect('}')?;
                self.build_typed(name, &kind, style.as_deref())
            }
            "plural" | "selectordinal" => {
                let plural_type = if kind == "selectordinal" {
                    self.uses_ordinal = true;
                    PluralType::Ordinal
                } else {
                    PluralType::Cardinal
                };
                self.expect(',')?;
                self.skip_whitespace();
                let offset = self.parse_offset()?;
                let cases = self.parse_cases(true)?;
                let cases = cases
                    .into_iter()
                    .map(|(key, parts)| {
                        let key = match key.strip_prefix('=') {
                            Some(exact) => exact
                                .parse::<f64>()
                                .map(PluralKey::Exact)
                                .map_err(|_| self.error(&format!("invalid plural case ={}", exact)))?,
                            None => PluralKey::Category(key),
                        };
                        Ok((key, parts))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Part::Plural { name, plural_type, offset, cases })
            }
            "select" => {
                self.expect(',')?;
                let cases = self.parse_cases(in_plural)?;
                Ok(Part::Select { name, cases })
            }
            other => Err(self.error(&format!("unknown argument type {:?}", other))),
        }
    }

    fn parse_offset(&mut self) -> Result<f64> {
        let rest: String = self.chars[self.pos..].iter().take(7).collect();
        if !rest.starts_with("offset:") {
            return Ok(0.0);
        }
        self.pos += "offset:".len();
        let value = self.read_until(&[' ', '\t', '\n', '{']);
        value.parse::<f64>().map_err(|_| self.error("invalid plural offset"))
    }

    /// Parse `key {message}` pairs up to and including the closing '}'
    fn parse_cases(&mut self, in_plural: bool) -> Result<Vec<(String, Vec<Part>)>> {
        let mut cases = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated argument")),
                _ => {}
            }
            let key = self.read_until(&['{', '}', ' ', '\t', '\n']);
            if key.is_empty() {
                return Err(self.error("missing case key"));
            }
            self.expect('{')?;
            let parts = self.parse_parts(in_plural)?;
            self.expect('}')?;
            cases.push((key, parts));
        }

        if !cases.iter().any(|(key, _)| key == "other") {
            return Err(self.error("an 'other' case is required"));
        }
        Ok(cases)
    }

    fn build_typed(&self, name: String, kind: &str, style: Option<&str>) -> Result<Part> {
        let options = match style {
            None => default_options(kind),
            Some(style) => self.style_options(kind, style)?,
        };
        if kind == "number" {
            let formatter = NumberFormatter::with_locale(self.locale.clone(), &options)?;
            Ok(Part::Number { name, formatter })
        } else {
            let kind = if kind == "date" { FormatterKind::Date } else { FormatterKind::Time };
            let formatter = DateTimeFormatter::with_locale(kind, self.locale.clone(), &options)?;
            Ok(Part::Instant { name, formatter })
        }
    }

    /// Options for a named style: presets in `formats` win over built-ins
    fn style_options(&self, kind: &str, style: &str) -> Result<FormatOptions> {
        if let Some(preset) = self.formats.get(kind).and_then(|group| group.get(style)) {
            return preset
                .as_object()
                .cloned()
                .ok_or_else(|| self.error(&format!("format {}.{} is not an options object", kind, style)));
        }

        let builtin = match (kind, style) {
            ("number", "integer") => json!({"maximumFractionDigits": 0}),
            ("number", "percent") => json!({"style": "percent"}),
            ("date", "short") => json!({"month": "numeric", "day": "numeric", "year": "2-digit"}),
            ("date", "medium") => json!({"month": "short", "day": "numeric", "year": "numeric"}),
            ("date", "long") => json!({"month": "long", "day": "numeric", "year": "numeric"}),
            ("date", "full") => json!({"weekday": "long", "month": "long", "day": "numeric", "year": "numeric"}),
            ("time", "short") => json!({"hour": "numeric", "minute": "numeric"}),
            ("time", "medium") | ("time", "long") | ("time", "full") => {
                json!({"hour": "numeric", "minute": "numeric", "second": "numeric"})
            }
            _ => return Err(self.error(&format!("unknown {} format {:?}", kind, style))),
        };
        Ok(into_options(builtin))
    }
}

fn default_options(kind: &str) -> FormatOptions {
    match kind {
        "time" => into_options(json!({"hour": "numeric", "minute": "numeric"})),
        _ => Map::new(),
    }
}

fn into_options(value: Value) -> FormatOptions {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
