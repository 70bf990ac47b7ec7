//! Option resolution: named preset plus call-site overrides

use chrono::{DateTime, Utc};
use crate::engine::{coerce_instant, FormatOptions, FormatterKind};
use crate::scope::ScopeBundle;
use crate::utils::errors::{IntlError, Result};

/// Key of the per-call reference instant for relative formatting
pub const NOW_KEY: &str = "now";

/// Final options for formatter construction
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub options: FormatOptions,
    /// Reference instant pulled out of relative-time options
    pub now: Option<DateTime<Utc>>,
}

/// Merge the preset `formats.<kind>.<preset>` with `overrides`
///
/// Override keys win per key. Without a preset the overrides are the
/// options. For [`FormatterKind::Relative`], `now` is removed from the
/// options and returned separately.
pub fn resolve_options(
    bundle: &ScopeBundle,
    kind: FormatterKind,
    preset: Option<&str>,
    overrides: &FormatOptions,
) -> Result<ResolvedOptions> {
    let mut options = match preset {
        Some(name) => {
            let mut merged = bundle.lookup_preset(kind, name)?.clone();
            for (key, value) in overrides {
                merged.insert(key.clone(), value.clone());
            }
            merged
        }
        None => overrides.clone(),
    };

    let now = match kind {
        FormatterKind::Relative => match options.remove(NOW_KEY) {
            None => None,
            Some(raw) => Some(coerce_instant(&raw).ok_or_else(|| {
                IntlError::invalid_argument(format!(
                    "A date or timestamp must be provided as `now` to {{{{formatRelative}}}}, got {}",
                    raw
                ))
            })?),
        },
        _ => None,
    };

    Ok(ResolvedOptions { options, now })
}
