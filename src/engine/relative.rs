//! Relative time formatting ("3 days ago", "in 2 hr.")
//!
//! Unit selection happens here; the phrases come from CLDR through one
//! ICU relative time formatter per unit, all built for the same locale.

use std::fmt;
use chrono::{DateTime, Utc};
use fixed_decimal::Decimal;
use icu::experimental::relativetime::options::Numeric;
use icu::experimental::relativetime::{RelativeTimeFormatter, RelativeTimeFormatterOptions};
use icu::locale::Locale;
use crate::engine::locale::resolve_locale;
use crate::engine::{option_choice, unsupported_input, FormatInput, FormatOptions, Formatter, FormatterKind};
use crate::utils::errors::{IntlError, Result};

const KIND: FormatterKind = FormatterKind::Relative;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Unit {
    const ALL: [Unit; 6] = [Unit::Second, Unit::Minute, Unit::Hour, Unit::Day, Unit::Month, Unit::Year];

    fn parse(value: &str) -> Self {
        match value.trim_end_matches('s') {
            "minute" => Unit::Minute,
            "hour" => Unit::Hour,
            "day" => Unit::Day,
            "month" => Unit::Month,
            "year" => Unit::Year,
            _ => Unit::Second,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Long,
    Short,
    Narrow,
}

/// `auto` allows phrases such as "yesterday" in place of "1 day ago"
fn build_unit(locale: &Locale, unit: Unit, width: Width, auto: bool) -> Result<RelativeTimeFormatter> {
    let mut options = RelativeTimeFormatterOptions::default();
    options.numeric = if auto { Numeric::Auto } else { Numeric::Always };
    let prefs = locale.clone().into();

    let built = match (width, unit) {
        (Width::Long, Unit::Second) => RelativeTimeFormatter::try_new_long_second(prefs, options),
        (Width::Long, Unit::Minute) => RelativeTimeFormatter::try_new_long_minute(prefs, options),
        (Width::Long, Unit::Hour) => RelativeTimeFormatter::try_new_long_hour(prefs, options),
        (Width::Long, Unit::Day) => RelativeTimeFormatter::try_new_long_day(prefs, options),
        (Width::Long, Unit::Month) => RelativeTimeFormatter::try_new_long_month(prefs, options),
        (Width::Long, Unit::Year) => RelativeTimeFormatter::try_new_long_year(prefs, options),
        (Width::Short, Unit::Second) => RelativeTimeFormatter::try_new_short_second(prefs, options),
        (Width::Short, Unit::Minute) => RelativeTimeFormatter::try_new_short_minute(prefs, options),
        (Width::Short, Unit::Hour) => RelativeTimeFormatter::try_new_short_hour(prefs, options),
        (Width::Short, Unit::Day) => RelativeTimeFormatter::try_new_short_day(prefs, options),
        (Width::Short, Unit::Month) => RelativeTimeFormatter::try_new_short_month(prefs, options),
        (Width::Short, Unit::Year) => RelativeTimeFormatter::try_new_short_year(prefs, options),
        (Width::Narrow, Unit::Second) => RelativeTimeFormatter::try_new_narrow_second(prefs, options),
        (Width::Narrow, Unit::Minute) => RelativeTimeFormatter::try_new_narrow_minute(prefs, options),
        (Width::Narrow, Unit::Hour) => RelativeTimeFormatter::try_new_narrow_hour(prefs, options),
        (Width::Narrow, Unit::Day) => RelativeTimeFormatter::try_new_narrow_day(prefs, options),
        (Width::Narrow, Unit::Month) => RelativeTimeFormatter::try_new_narrow_month(prefs, options),
        (Width::Narrow, Unit::Year) => RelativeTimeFormatter::try_new_narrow_year(prefs, options),
    };
    built.map_err(|e| IntlError::construction(KIND, format!("no relative time data for {}: {:?}", locale, e)))
}

/// Formats the distance between an instant and a reference `now`
pub struct RelativeFormatter {
    locale: Locale,
    units: Option<Unit>,
    /// One formatter per unit, indexed by `Unit::index`
    formatters: Vec<RelativeTimeFormatter>,
}

impl RelativeFormatter {
    pub fn new(locales: &[String], options: &FormatOptions) -> Result<Self> {
        let locale = resolve_locale(KIND, locales)?;

        let units = option_choice(
            KIND,
            options,
            "units",
            &[
                "second", "minute", "hour", "day", "month", "year",
                "seconds", "minutes", "hours", "days", "months", "years",
            ],
        )?
        .map(Unit::parse);
        let (width, auto) = match option_choice(KIND, options, "style", &["best fit", "numeric", "long", "short", "narrow"])? {
            Some("numeric") | Some("long") => (Width::Long, false),
            Some("short") => (Width::Short, false),
            Some("narrow") => (Width::Narrow, false),
            _ => (Width::Long, true),
        };

        let formatters = Unit::ALL
            .iter()
            .map(|unit| build_unit(&locale, *unit, width, auto))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { locale, units, formatters })
    }

    /// Format `instant` relative to `now`
    pub fn format_relative(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let millis = (instant - now).num_milliseconds() as f64;
        let (unit, value) = self.select_unit(millis);
        self.formatters[unit.index()].format(Decimal::from(value)).to_string()
    }

    fn select_unit(&self, millis: f64) -> (Unit, i64) {
        let seconds = millis / 1000.0;
        let minutes = seconds / 60.0;
        let hours = minutes / 60.0;
        let days = hours / 24.0;
        let months = days * 400.0 / 146_097.0 * 12.0;
        let years = months / 12.0;

        let value_in = |unit: Unit| -> i64 {
            let raw = match unit {
                Unit::Second => seconds,
                Unit::Minute => minutes,
                Unit::Hour => hours,
                Unit::Day => days,
                Unit::Month => months,
                Unit::Year => years,
            };
            raw.round() as i64
        };

        let unit = self.units.unwrap_or_else(|| {
            if value_in(Unit::Second).abs() < 45 {
                Unit::Second
            } else if value_in(Unit::Minute).abs() < 45 {
                Unit::Minute
            } else if value_in(Unit::Hour).abs() < 22 {
                Unit::Hour
            } else if value_in(Unit::Day).abs() < 26 {
                Unit::Day
            } else if value_in(Unit::Month).abs() < 11 {
                Unit::Month
            } else {
                Unit::Year
            }
        });
        (unit, value_in(unit))
    }
}

impl fmt::Debug for RelativeFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelativeFormatter")
            .field("locale", &self.locale.to_string())
            .field("units", &self.units)
            .finish()
    }
}

impl Formatter for RelativeFormatter {
    fn kind(&self) -> FormatterKind {
        KIND
    }

    fn format(&self, input: FormatInput<'_>) -> Result<String> {
        match input {
            FormatInput::Relative { instant, now } => Ok(self.format_relative(instant, now)),
            other => Err(unsupported_input(KIND, &other)),
        }
    }
}
