//! Locale data module
//!
//! Loads the per-locale `formats` and `messages` an application feeds into
//! its rendering frames.

pub mod loader;

pub use loader::{DataStats, IntlDataStore, LocaleStats};
