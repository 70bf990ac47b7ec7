//! Template Intl
//!
//! Locale-aware formatting helpers for template engines: dates, times,
//! relative times, numbers and ICU-style messages. Helpers discover their
//! locale data by walking the rendering context, and every formatter they
//! construct is cached for reuse.

pub mod config;
pub mod engine;
pub mod format;
pub mod i18n;
pub mod scope;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use config::{IntlConfig, Settings};
pub use utils::errors::{ErrorCategory, IntlError, Result};

// Re-export main components for easy access
pub use engine::{BasicEngine, FormatInput, FormatOptions, Formatter, FormatterFactory, FormatterKind};
pub use format::{FormatterCache, IntlHelpers};
pub use i18n::IntlDataStore;
pub use scope::{ContextStack, Frame, MessageHandle, ParentData, ScopeBundle};
pub use template::{register_with, HelperRegistry, HelperTable, HelperValue, SafeString};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
