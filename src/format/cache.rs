//! Formatter cache
//!
//! Constructed formatters are kept for the life of the cache, keyed by
//! `(kind, locales, options)`. There is no eviction: the key space is the
//! set of distinct locale/option combinations a deployment actually uses.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use serde_json::{json, Value};
use tracing::debug;
use crate::engine::{BasicEngine, FormatOptions, Formatter, FormatterFactory, FormatterKind};
use crate::utils::errors::Result;
use crate::utils::logging::log_formatter_built;

/// Structural cache key
///
/// Locale order is significant; option key order is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: FormatterKind,
    locales: Vec<String>,
    options: String,
}

impl CacheKey {
    pub fn new(kind: FormatterKind, locales: &[String], options: &FormatOptions) -> Self {
        let mut canonical = String::new();
        write_canonical(&mut canonical, &Value::Object(options.clone()));
        Self {
            kind,
            locales: locales.to_vec(),
            options: canonical,
        }
    }

    /// Key for a message formatter: template and named formats take the place of options
    pub fn for_message(locales: &[String], template: &str, formats: &FormatOptions) -> Self {
        let mut canonical = String::new();
        write_canonical(&mut canonical, &json!({"message": template, "formats": formats}));
        Self {
            kind: FormatterKind::Message,
            locales: locales.to_vec(),
            options: canonical,
        }
    }
}

/// Serialize `value` with object keys sorted at every level
fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(out, &map[key.as_str()]);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes formatter construction
pub struct FormatterCache {
    factory: Arc<dyn FormatterFactory>,
    entries: RwLock<HashMap<CacheKey, Arc<dyn Formatter>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FormatterCache {
    /// Cache in front of `factory`
    pub fn new(factory: Arc<dyn FormatterFactory>) -> Self {
        Self {
            factory,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Formatter for `(kind, locales, options)`, built on first request
    pub fn get(&self, kind: FormatterKind, locales: &[String], options: &FormatOptions) -> Result<Arc<dyn Formatter>> {
        let key = CacheKey::new(kind, locales, options);
        self.get_or_build(key, || self.factory.build(kind, locales, options))
    }

    /// Message formatter for `template`, built on first request
    pub fn get_message(&self, locales: &[String], template: &str, formats: &FormatOptions) -> Result<Arc<dyn Formatter>> {
        let key = CacheKey::for_message(locales, template, formats);
        self.get_or_build(key, || self.factory.build_message(locales, template, formats))
    }

    fn get_or_build<F>(&self, key: CacheKey, build: F) -> Result<Arc<dyn Formatter>>
    where
        F: FnOnce() -> Result<Arc<dyn Formatter>>,
    {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(formatter) = entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(kind = %key.kind, locales = ?key.locales, "Formatter cache hit");
                return Ok(Arc::clone(formatter));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // Built outside the lock; errors are returned without caching anything
        let built = build()?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let kind = key.kind;
        let locales = key.locales.clone();
        // A concurrent first request may have won the race; hand out its instance
        let retained = Arc::clone(entries.entry(key).or_insert(built));
        log_formatter_built(kind.as_str(), &locales, entries.len());
        Ok(retained)
    }

    /// Number of cached formatters
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached formatter and reset the counters
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for FormatterCache {
    fn default() -> Self {
        Self::new(Arc::new(BasicEngine))
    }
}

impl std::fmt::Debug for FormatterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterCache").field("stats", &self.stats()).finish()
    }
}
