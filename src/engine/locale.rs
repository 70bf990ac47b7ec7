//! Locale tag parsing and negotiation

use icu::locale::{locale, Locale};
use crate::engine::FormatterKind;
use crate::utils::errors::{IntlError, Result};

/// Check that `tag` parses as a BCP 47 language tag
pub fn is_well_formed_tag(tag: &str) -> bool {
    Locale::try_from_str(tag).is_ok()
}

/// Validate `locales` and pick the one every formatter of a call uses
///
/// The first tag wins; CLDR data fallback inside each formatter takes care of
/// regional variants. An empty list means the engine default (`en`).
pub fn resolve_locale(kind: FormatterKind, locales: &[String]) -> Result<Locale> {
    let mut parsed = Vec::with_capacity(locales.len());
    for tag in locales {
        let locale = Locale::try_from_str(tag).map_err(|_| {
            IntlError::construction(kind, format!("Incorrect locale information provided: {:?}", tag))
        })?;
        parsed.push(locale);
    }

    Ok(parsed.into_iter().next().unwrap_or(locale!("en")))
}
