//! Plural category selection backed by CLDR rules

use std::fmt;
use fixed_decimal::{Decimal, FloatPrecision};
use icu::locale::Locale;
use icu::plurals::{PluralCategory, PluralRules};
use crate::engine::FormatterKind;
use crate::utils::errors::{IntlError, Result};

/// Cardinal (`plural`) or ordinal (`selectordinal`) rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralType {
    Cardinal,
    Ordinal,
}

/// Plural rules of one locale
pub struct PluralSelector {
    rules: PluralRules,
    plural_type: PluralType,
}

impl PluralSelector {
    pub fn new(kind: FormatterKind, locale: &Locale, plural_type: PluralType) -> Result<Self> {
        let rules = match plural_type {
            PluralType::Cardinal => PluralRules::try_new_cardinal(locale.clone().into()),
            PluralType::Ordinal => PluralRules::try_new_ordinal(locale.clone().into()),
        }
        .map_err(|e| IntlError::construction(kind, format!("no plural rules for {}: {:?}", locale, e)))?;

        Ok(Self { rules, plural_type })
    }

    /// CLDR category keyword for `n`
    pub fn category(&self, n: f64) -> &'static str {
        match Decimal::try_from_f64(n, FloatPrecision::RoundTrip) {
            Ok(decimal) => category_name(self.rules.category_for(&decimal)),
            Err(_) => "other",
        }
    }
}

impl fmt::Debug for PluralSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralSelector").field("plural_type", &self.plural_type).finish()
    }
}

fn category_name(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icu::locale::locale;

    fn cardinal(locale: Locale) -> PluralSelector {
        PluralSelector::new(FormatterKind::Message, &locale, PluralType::Cardinal).unwrap()
    }

    #[test]
    fn test_plural_form_english() {
        let en = cardinal(locale!("en"));
        assert_eq!(en.category(0.0), "other");
        assert_eq!(en.category(1.0), "one");
        assert_eq!(en.category(1.5), "other");
        assert_eq!(en.category(5.0), "other");
    }

    #[test]
    fn test_plural_form_french() {
        let fr = cardinal(locale!("fr"));
        assert_eq!(fr.category(0.0), "one");
        assert_eq!(fr.category(1.5), "one");
        assert_eq!(fr.category(2.0), "other");
    }

    #[test]
    fn test_plural_form_slavic() {
        let ru = cardinal(locale!("ru"));
        assert_eq!(ru.category(1.0), "one");
        assert_eq!(ru.category(2.0), "few");
        assert_eq!(ru.category(5.0), "many");
        assert_eq!(ru.category(11.0), "many");
        assert_eq!(ru.category(21.0), "one");
        assert_eq!(ru.category(2.5), "other");

        let pl = cardinal(locale!("pl"));
        assert_eq!(pl.category(1.0), "one");
        assert_eq!(pl.category(2.0), "few");
        assert_eq!(pl.category(5.0), "many");
        assert_eq!(pl.category(22.0), "few");
        assert_eq!(pl.category(1.5), "other");
    }

    #[test]
    fn test_ordinal_english() {
        let en = PluralSelector::new(FormatterKind::Message, &locale!("en"), PluralType::Ordinal).unwrap();
        let categories: Vec<_> = [1.0, 2.0, 3.0, 4.0, 11.0, 22.0].iter().map(|n| en.category(*n)).collect();
        assert_eq!(categories, vec!["one", "two", "few", "other", "other", "two"]);
    }
}
