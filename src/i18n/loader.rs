//! Locale data loading
//!
//! Each supported locale may ship a `<data_dir>/<locale>.json` file holding
//! the `formats` and `messages` a template rendered in that locale sees.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, info, warn};
use crate::config::IntlConfig;
use crate::scope::{Frame, MessageNode, ScopeBundle};
use crate::utils::errors::{IntlError, Result};

/// Per-locale scope data loaded from disk
#[derive(Debug, Clone)]
pub struct IntlDataStore {
    /// Loaded bundles by locale tag
    bundles: HashMap<String, ScopeBundle>,
    data_dir: PathBuf,
    /// Locale whose data file must exist
    default_locale: Option<String>,
    supported_locales: Vec<String>,
}

impl IntlDataStore {
    pub fn new(config: &IntlConfig) -> Self {
        let supported_locales = if config.supported_locales.is_empty() {
            config.default_locales.clone()
        } else {
            config.supported_locales.clone()
        };

        Self {
            bundles: HashMap::new(),
            data_dir: PathBuf::from(&config.data_dir),
            default_locale: config.default_locales.first().cloned(),
            supported_locales,
        }
    }

    /// Load the data file of every supported locale
    ///
    /// A missing file is only fatal for the default locale; a file that
    /// exists but does not parse is fatal for any supported locale.
    pub async fn load_bundles(&mut self) -> Result<()> {
        if !self.data_dir.exists() {
            warn!("Locale data directory not found: {}", self.data_dir.display());
        }

        let supported_locales = self.supported_locales.clone();
        for locale in &supported_locales {
            let file_path = self.data_dir.join(format!("{}.json", locale));
            let is_default = self.default_locale.as_deref() == Some(locale.as_str());

            if file_path.exists() {
                match self.load_locale_file(&file_path, locale).await {
                    Ok(_) => info!("Loaded locale data for: {}", locale),
                    Err(e) => {
                        error!("Failed to load locale data for {}: {}", locale, e);
                        return Err(IntlError::Config(format!(
                            "Failed to load locale data {}: {}",
                            file_path.display(),
                            e
                        )));
                    }
                }
            } else {
                warn!("Locale data file not found: {}", file_path.display());
                if is_default {
                    return Err(IntlError::Config(format!(
                        "Default locale data file not found: {}",
                        file_path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    async fn load_locale_file(&mut self, file_path: &Path, locale: &str) -> Result<()> {
        let content = fs::read_to_string(file_path).await?;
        let raw: Value = serde_json::from_str(&content)?;
        if !raw.is_object() {
            return Err(IntlError::Config(format!("Invalid locale data file format for {}", locale)));
        }

        let mut bundle = ScopeBundle::from_value(raw)?;
        bundle.locales = Some(vec![locale.to_string()]);
        debug!(
            locale = locale,
            messages = bundle.messages.as_ref().map_or(0, count_messages),
            "Parsed locale data"
        );
        self.bundles.insert(locale.to_string(), bundle);
        Ok(())
    }

    /// Drop everything and load again
    pub async fn reload_bundles(&mut self) -> Result<()> {
        self.bundles.clear();
        self.load_bundles().await
    }

    /// Scope bundle for `locale`, with `locales` set to that tag
    pub fn bundle_for(&self, locale: &str) -> Option<ScopeBundle> {
        self.bundles.get(locale).cloned()
    }

    /// Rendering frame carrying the bundle for `locale` over `data`
    pub fn frame_for(&self, locale: &str, data: Value) -> Option<Frame> {
        self.bundle_for(locale).map(|bundle| Frame::with_intl(data, bundle))
    }

    pub fn is_loaded(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    pub fn supported_locales(&self) -> &[String] {
        &self.supported_locales
    }

    pub fn default_locale(&self) -> Option<&str> {
        self.default_locale.as_deref()
    }

    /// Per-locale message and preset counts
    pub fn get_stats(&self) -> DataStats {
        let mut locales: Vec<LocaleStats> = self
            .bundles
            .iter()
            .map(|(code, bundle)| LocaleStats {
                code: code.clone(),
                message_count: bundle.messages.as_ref().map_or(0, count_messages),
                preset_count: bundle.formats.as_ref().map_or(0, |formats| {
                    formats
                        .values()
                        .filter_map(Value::as_object)
                        .map(|presets| presets.len())
                        .sum()
                }),
            })
            .collect();
        locales.sort_by(|a, b| a.code.cmp(&b.code));

        let total_messages = self
            .default_locale
            .as_deref()
            .and_then(|code| locales.iter().find(|stats| stats.code == code))
            .map_or(0, |stats| stats.message_count);

        DataStats { locales, total_messages }
    }
}

/// Count leaf messages in a message tree
fn count_messages(messages: &BTreeMap<String, MessageNode>) -> usize {
    messages
        .values()
        .map(|node| match node {
            MessageNode::Group(children) => count_messages(children),
            _ => 1,
        })
        .sum()
}

/// Locale data statistics
#[derive(Debug, Clone)]
pub struct DataStats {
    pub locales: Vec<LocaleStats>,
    /// Messages in the default locale
    pub total_messages: usize,
}

/// Statistics for one locale
#[derive(Debug, Clone)]
pub struct LocaleStats {
    pub code: String,
    pub message_count: usize,
    pub preset_count: usize,
}
