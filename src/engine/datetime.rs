//! Date and time formatting

use std::fmt;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use icu::calendar::{Date, Iso};
use icu::datetime::fieldsets::builder::{DateFields, FieldSetBuilder};
use icu::datetime::fieldsets::enums::CompositeDateTimeFieldSet;
use icu::datetime::input::{DateTime as IcuDateTime, Time};
use icu::datetime::options::{Length, TimePrecision, YearStyle};
use icu::datetime::{DateTimeFormatter as IcuDateTimeFormatter, DateTimeFormatterPreferences};
use icu::locale::preferences::extensions::unicode::keywords::HourCycle;
use icu::locale::Locale;
use serde_json::Value;
use crate::engine::locale::resolve_locale;
use crate::engine::{
    option_bool, option_choice, option_str, unsupported_input, FormatInput, FormatOptions,
    Formatter, FormatterKind,
};
use crate::utils::errors::{IntlError, Result};

const NUMERIC: &[&str] = &["numeric", "2-digit"];
const TEXT: &[&str] = &["long", "short", "narrow"];
const MONTH: &[&str] = &["numeric", "2-digit", "long", "short", "narrow"];

/// Requested fields, in `Intl.DateTimeFormat` option terms
#[derive(Debug)]
struct Fields<'a> {
    weekday: Option<&'a str>,
    year: Option<&'a str>,
    month: Option<&'a str>,
    day: Option<&'a str>,
    hour: bool,
    minute: bool,
    second: bool,
}

impl Fields<'_> {
    fn is_empty(&self) -> bool {
        self.weekday.is_none()
            && self.year.is_none()
            && self.month.is_none()
            && self.day.is_none()
            && !self.has_time()
    }

    fn has_time(&self) -> bool {
        self.hour || self.minute || self.second
    }

    /// Textual months widen the pattern; numeric ones keep it short
    fn length(&self) -> Length {
        match self.month.or(self.weekday) {
            Some("long") => Length::Long,
            Some("short") | Some("narrow") => Length::Medium,
            _ => Length::Short,
        }
    }

    fn date_fields(&self) -> Option<DateFields> {
        let (y, m, d, e) = (
            self.year.is_some(),
            self.month.is_some(),
            self.day.is_some(),
            self.weekday.is_some(),
        );
        // a time can only attach to a full day
        let d = d || (e && (y || m)) || (self.has_time() && (y || m));

        let fields = match (y, m, d, e) {
            (false, false, false, false) => return None,
            (false, false, false, true) => DateFields::E,
            (false, false, true, false) => DateFields::D,
            (false, false, true, true) => DateFields::DE,
            (false, true, true, false) => DateFields::MD,
            (false, true, true, true) => DateFields::MDE,
            (true, _, true, false) => DateFields::YMD,
            (true, _, true, true) => DateFields::YMDE,
            (true, true, false, _) => DateFields::YM,
            (true, false, false, _) => DateFields::Y,
            (false, true, false, _) => DateFields::M,
        };
        Some(fields)
    }

    fn time_precision(&self) -> Option<TimePrecision> {
        if self.second {
            Some(TimePrecision::Second)
        } else if self.minute {
            Some(TimePrecision::Minute)
        } else if self.hour {
            Some(TimePrecision::Hour)
        } else {
            None
        }
    }

    fn year_style(&self, date_fields: Option<&DateFields>) -> Option<YearStyle> {
        let has_year = matches!(
            date_fields,
            Some(DateFields::Y | DateFields::YM | DateFields::YMD | DateFields::YMDE)
        );
        match self.year {
            Some("2-digit") if has_year => Some(YearStyle::Auto),
            Some(_) if has_year => Some(YearStyle::Full),
            _ => None,
        }
    }
}

/// Formats instants according to the requested date and time fields
pub struct DateTimeFormatter {
    kind: FormatterKind,
    locale: Locale,
    formatter: IcuDateTimeFormatter<CompositeDateTimeFieldSet>,
    offset: FixedOffset,
}

impl DateTimeFormatter {
    pub fn new(kind: FormatterKind, locales: &[String], options: &FormatOptions) -> Result<Self> {
        let locale = resolve_locale(kind, locales)?;
        Self::with_locale(kind, locale, options)
    }

    /// Build for an already negotiated locale
    pub fn with_locale(kind: FormatterKind, locale: Locale, options: &FormatOptions) -> Result<Self> {
        let mut fields = Fields {
            weekday: option_choice(kind, options, "weekday", TEXT)?,
            year: option_choice(kind, options, "year", NUMERIC)?,
            month: option_choice(kind, options, "month", MONTH)?,
            day: option_choice(kind, options, "day", NUMERIC)?,
            hour: option_choice(kind, options, "hour", NUMERIC)?.is_some(),
            minute: option_choice(kind, options, "minute", NUMERIC)?.is_some(),
            second: option_choice(kind, options, "second", NUMERIC)?.is_some(),
        };
        if fields.is_empty() {
            fields.year = Some("numeric");
            fields.month = Some("numeric");
            fields.day = Some("numeric");
        }

        let mut prefs = DateTimeFormatterPreferences::from(locale.clone());
        if let Some(hour12) = option_bool(kind, options, "hour12")? {
            prefs.hour_cycle = Some(if hour12 { HourCycle::H12 } else { HourCycle::H23 });
        }
        let offset = parse_time_zone(kind, option_str(kind, options, "timeZone")?)?;

        let date_fields = fields.date_fields();
        let mut builder = FieldSetBuilder::default();
        builder.length = Some(fields.length());
        builder.year_style = fields.year_style(date_fields.as_ref());
        builder.date_fields = date_fields;
        builder.time_precision = fields.time_precision();
        let field_set = builder
            .build_composite_datetime()
            .map_err(|e| IntlError::construction(kind, format!("unsupported field combination: {:?}", e)))?;

        let formatter = IcuDateTimeFormatter::try_new(prefs, field_set)
            .map_err(|e| IntlError::construction(kind, format!("no date data for {}: {:?}", locale, e)))?;

        Ok(Self { kind, locale, formatter, offset })
    }

    /// Format an instant in the configured time zone
    pub fn format_instant(&self, instant: DateTime<Utc>) -> Result<String> {
        let local = instant.with_timezone(&self.offset);
        let out_of_range = || {
            IntlError::invalid_argument(format!("{} is outside the supported calendar range", instant))
        };

        let date = Date::try_new_iso(local.year(), local.month() as u8, local.day() as u8)
            .map_err(|_| out_of_range())?;
        let time = Time::try_new(local.hour() as u8, local.minute() as u8, local.second() as u8, 0)
            .map_err(|_| out_of_range())?;
        let input: IcuDateTime<Iso> = IcuDateTime { date, time };

        Ok(self.formatter.format(&input).to_string())
    }
}

impl fmt::Debug for DateTimeFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimeFormatter")
            .field("kind", &self.kind)
            .field("locale", &self.locale.to_string())
            .field("offset", &self.offset)
            .finish()
    }
}

impl Formatter for DateTimeFormatter {
    fn kind(&self) -> FormatterKind {
        self.kind
    }

    fn format(&self, input: FormatInput<'_>) -> Result<String> {
        match input {
            FormatInput::Instant(instant) => self.format_instant(instant),
            other => Err(unsupported_input(self.kind, &other)),
        }
    }
}

/// Coerce a template value to an instant
///
/// Numbers are epoch milliseconds; strings may be RFC 3339 timestamps,
/// `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or plain `YYYY-MM-DD` dates.
/// Anything else, including non-finite numbers, yields `None`.
pub fn coerce_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => {
            let millis = number.as_f64().filter(|ms| ms.is_finite())?;
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        Value::String(text) => {
            let text = text.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

fn parse_time_zone(kind: FormatterKind, zone: Option<&str>) -> Result<FixedOffset> {
    let invalid = || IntlError::construction(kind, format!("Invalid time zone specified: {}", zone.unwrap_or("")));

    let seconds = match zone {
        None | Some("UTC") | Some("Etc/UTC") | Some("GMT") | Some("Z") => 0,
        Some(zone) => {
            let (sign, rest) = match zone.as_bytes().first() {
                Some(b'+') => (1, &zone[1..]),
                Some(b'-') => (-1, &zone[1..]),
                _ => return Err(invalid()),
            };
            let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
            let hours: i32 = hours.parse().map_err(|_| invalid())?;
            let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
            if hours > 23 || minutes > 59 {
                return Err(invalid());
            }
            sign * (hours * 3600 + minutes * 60)
        }
    };
    FixedOffset::east_opt(seconds).ok_or_else(invalid)
}
