//! Helper operations: option resolution, formatter caching and dispatch

pub mod cache;
pub mod dispatcher;
pub mod options;

pub use cache::{CacheKey, CacheStats, FormatterCache};
pub use dispatcher::IntlHelpers;
pub use options::{resolve_options, ResolvedOptions, NOW_KEY};
