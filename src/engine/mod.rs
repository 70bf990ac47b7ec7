//! Formatting engines
//!
//! The helper layer treats formatters as opaque objects built from
//! `(locales, options)`. This module defines that seam ([`FormatterFactory`]
//! and [`Formatter`]) and ships [`BasicEngine`], which maps the option names
//! of `Intl.*` formatters onto ICU4X formatters backed by CLDR data, plus an
//! ICU-style message formatter.

pub mod datetime;
pub mod locale;
pub mod message;
pub mod number;
pub mod plural;
pub mod relative;

use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use crate::utils::errors::{IntlError, Result};

pub use datetime::{coerce_instant, DateTimeFormatter};
pub use message::MessageFormatter;
pub use number::NumberFormatter;
pub use relative::RelativeFormatter;

/// Formatter options, as written in presets and helper hashes
pub type FormatOptions = Map<String, Value>;

/// Which formatting engine (and cache partition) a call uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatterKind {
    Date,
    Time,
    Relative,
    Number,
    Message,
}

impl FormatterKind {
    /// Name used under `formats.<kind>` for presets
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatterKind::Date => "date",
            FormatterKind::Time => "time",
            FormatterKind::Relative => "relative",
            FormatterKind::Number => "number",
            FormatterKind::Message => "message",
        }
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value handed to [`Formatter::format`]
#[derive(Debug, Clone, Copy)]
pub enum FormatInput<'a> {
    Instant(DateTime<Utc>),
    Relative { instant: DateTime<Utc>, now: DateTime<Utc> },
    Number(f64),
    Message(&'a FormatOptions),
}

impl FormatInput<'_> {
    fn describe(&self) -> &'static str {
        match self {
            FormatInput::Instant(_) => "an instant",
            FormatInput::Relative { .. } => "a relative instant",
            FormatInput::Number(_) => "a number",
            FormatInput::Message(_) => "message values",
        }
    }
}

/// A constructed formatter instance
pub trait Formatter: Send + Sync {
    /// Kind this formatter was built for
    fn kind(&self) -> FormatterKind;

    /// Produce the formatted string
    fn format(&self, input: FormatInput<'_>) -> Result<String>;
}

impl fmt::Debug for dyn Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formatter({})", self.kind())
    }
}

/// Builds formatter instances; one construction call per kind
pub trait FormatterFactory: Send + Sync {
    /// Build a date, time, relative or number formatter
    fn build(
        &self,
        kind: FormatterKind,
        locales: &[String],
        options: &FormatOptions,
    ) -> Result<Arc<dyn Formatter>>;

    /// Build a message formatter for `template`, resolving named styles in `formats`
    fn build_message(
        &self,
        locales: &[String],
        template: &str,
        formats: &FormatOptions,
    ) -> Result<Arc<dyn Formatter>>;
}

/// Built-in formatting engine
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEngine;

impl FormatterFactory for BasicEngine {
    fn build(
        &self,
        kind: FormatterKind,
        locales: &[String],
        options: &FormatOptions,
    ) -> Result<Arc<dyn Formatter>> {
        match kind {
            FormatterKind::Date | FormatterKind::Time => {
                Ok(Arc::new(DateTimeFormatter::new(kind, locales, options)?))
            }
            FormatterKind::Relative => Ok(Arc::new(RelativeFormatter::new(locales, options)?)),
            FormatterKind::Number => Ok(Arc::new(NumberFormatter::new(locales, options)?)),
            FormatterKind::Message => Err(IntlError::construction(
                kind,
                "message formatters are built from a template",
            )),
        }
    }

    fn build_message(
        &self,
        locales: &[String],
        template: &str,
        formats: &FormatOptions,
    ) -> Result<Arc<dyn Formatter>> {
        Ok(Arc::new(MessageFormatter::new(locales, template, formats)?))
    }
}

/// Error for a formatter handed an input of the wrong shape
pub(crate) fn unsupported_input(kind: FormatterKind, input: &FormatInput<'_>) -> IntlError {
    IntlError::invalid_argument(format!("{} formatter cannot format {}", kind, input.describe()))
}

/// Read an optional string option
pub(crate) fn option_str<'a>(
    kind: FormatterKind,
    options: &'a FormatOptions,
    key: &str,
) -> Result<Option<&'a str>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(IntlError::construction(
            kind,
            format!("option {} must be a string, got {}", key, other),
        )),
    }
}

/// Read an optional string option restricted to `allowed`
pub(crate) fn option_choice<'a>(
    kind: FormatterKind,
    options: &'a FormatOptions,
    key: &str,
    allowed: &[&str],
) -> Result<Option<&'a str>> {
    match option_str(kind, options, key)? {
        Some(value) if !allowed.contains(&value) => Err(IntlError::construction(
            kind,
            format!("value {} out of range for option {}", value, key),
        )),
        other => Ok(other),
    }
}

/// Read an optional boolean option
pub(crate) fn option_bool(kind: FormatterKind, options: &FormatOptions, key: &str) -> Result<Option<bool>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(IntlError::construction(
            kind,
            format!("option {} must be a boolean, got {}", key, other),
        )),
    }
}

/// Read an optional integer option within `min..=max`
pub(crate) fn option_digits(
    kind: FormatterKind,
    options: &FormatOptions,
    key: &str,
    min: u64,
    max: u64,
) -> Result<Option<usize>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_u64() {
            Some(n) if (min..=max).contains(&n) => Ok(Some(n as usize)),
            _ => Err(IntlError::construction(
                kind,
                format!("{} value is out of range", key),
            )),
        },
    }
}
