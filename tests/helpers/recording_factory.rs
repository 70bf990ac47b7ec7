//! Formatter factory that records what it builds and what it formats

use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc};
use template_intl::engine::{BasicEngine, FormatInput, FormatOptions, Formatter, FormatterFactory, FormatterKind};
use template_intl::Result;

/// One construction call
#[derive(Debug, Clone)]
pub struct BuildRecord {
    pub kind: FormatterKind,
    pub locales: Vec<String>,
    pub options: FormatOptions,
}

/// Delegates to [`BasicEngine`], keeping a log of constructions and relative calls
#[derive(Default)]
pub struct RecordingFactory {
    builds: Mutex<Vec<BuildRecord>>,
    relative_calls: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>>,
}

impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn builds(&self) -> Vec<BuildRecord> {
        self.builds.lock().unwrap().clone()
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }

    /// `(instant, now)` pairs passed to relative formatters
    pub fn relative_calls(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.relative_calls.lock().unwrap().clone()
    }

    fn wrap(&self, inner: Arc<dyn Formatter>) -> Arc<dyn Formatter> {
        Arc::new(RecordingFormatter {
            inner,
            relative_calls: Arc::clone(&self.relative_calls),
        })
    }
}

impl FormatterFactory for RecordingFactory {
    fn build(&self, kind: FormatterKind, locales: &[String], options: &FormatOptions) -> Result<Arc<dyn Formatter>> {
        self.builds.lock().unwrap().push(BuildRecord {
            kind,
            locales: locales.to_vec(),
            options: options.clone(),
        });
        let inner = BasicEngine.build(kind, locales, options)?;
        Ok(self.wrap(inner))
    }

    fn build_message(&self, locales: &[String], template: &str, formats: &FormatOptions) -> Result<Arc<dyn Formatter>> {
        let mut options = FormatOptions::new();
        options.insert("message".to_string(), template.into());
        self.builds.lock().unwrap().push(BuildRecord {
            kind: FormatterKind::Message,
            locales: locales.to_vec(),
            options,
        });
        let inner = BasicEngine.build_message(locales, template, formats)?;
        Ok(self.wrap(inner))
    }
}

struct RecordingFormatter {
    inner: Arc<dyn Formatter>,
    relative_calls: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>>,
}

impl Formatter for RecordingFormatter {
    fn kind(&self) -> FormatterKind {
        self.inner.kind()
    }

    fn format(&self, input: FormatInput<'_>) -> Result<String> {
        if let FormatInput::Relative { instant, now } = input {
            self.relative_calls.lock().unwrap().push((instant, now));
        }
        self.inner.format(input)
    }
}
