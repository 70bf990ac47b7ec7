//! Number formatting

use std::fmt;
use fixed_decimal::{Decimal, FloatPrecision};
use icu::decimal::options::{DecimalFormatterOptions, GroupingStrategy};
use icu::decimal::DecimalFormatter;
use icu::experimental::dimension::currency::formatter::CurrencyFormatter;
use icu::experimental::dimension::currency::CurrencyCode;
use icu::experimental::dimension::percent::formatter::PercentFormatter;
use icu::locale::Locale;
use tinystr::TinyAsciiStr;
use crate::engine::locale::resolve_locale;
use crate::engine::{
    option_bool, option_choice, option_digits, option_str, unsupported_input, FormatInput,
    FormatOptions, Formatter, FormatterKind,
};
use crate::utils::errors::{IntlError, Result};

const KIND: FormatterKind = FormatterKind::Number;

enum NumberStyle {
    Decimal(DecimalFormatter),
    Percent(PercentFormatter<DecimalFormatter>),
    Currency { code: CurrencyCode, formatter: CurrencyFormatter },
}

/// Formats numbers as decimals, percentages or currency amounts
pub struct NumberFormatter {
    locale: Locale,
    style: NumberStyle,
    min_integer: usize,
    min_fraction: usize,
    max_fraction: usize,
}

impl NumberFormatter {
    pub fn new(locales: &[String], options: &FormatOptions) -> Result<Self> {
        let locale = resolve_locale(KIND, locales)?;
        Self::with_locale(locale, options)
    }

    /// Build for an already negotiated locale
    pub fn with_locale(locale: Locale, options: &FormatOptions) -> Result<Self> {
        let style_name = option_choice(KIND, options, "style", &["decimal", "percent", "currency"])?;

        let currency = match style_name {
            Some("currency") => {
                let code = option_str(KIND, options, "currency")?.ok_or_else(|| {
                    IntlError::construction(KIND, "Currency code is required with currency style.")
                })?;
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(IntlError::construction(KIND, format!("Invalid currency code: {}", code)));
                }
                option_choice(KIND, options, "currencyDisplay", &["symbol"])?;
                Some(code.to_ascii_uppercase())
            }
            _ => None,
        };

        let (default_min, default_max) = match (style_name, &currency) {
            (_, Some(code)) => {
                let digits = currency_digits(code);
                (digits, digits)
            }
            (Some("percent"), _) => (0, 0),
            _ => (0, 3),
        };

        let min_integer = option_digits(KIND, options, "minimumIntegerDigits", 1, 21)?.unwrap_or(1);
        let min_fraction = option_digits(KIND, options, "minimumFractionDigits", 0, 20)?;
        let max_fraction = option_digits(KIND, options, "maximumFractionDigits", 0, 20)?;
        let (min_fraction, max_fraction) = match (min_fraction, max_fraction) {
            (Some(min), Some(max)) if min > max => {
                return Err(IntlError::construction(KIND, "maximumFractionDigits value is out of range"));
            }
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, default_max.max(min)),
            (None, Some(max)) => (default_min.min(max), max),
            (None, None) => (default_min, default_max),
        };

        let mut decimal_options = DecimalFormatterOptions::default();
        if option_bool(KIND, options, "useGrouping")? == Some(false) {
            decimal_options.grouping_strategy = Some(GroupingStrategy::Never);
        }

        let style = match (style_name, currency) {
            (_, Some(code)) => {
                let code = code
                    .parse::<TinyAsciiStr<3>>()
                    .map_err(|_| IntlError::construction(KIND, format!("Invalid currency code: {}", code)))?;
                NumberStyle::Currency {
                    code: CurrencyCode(code),
                    formatter: CurrencyFormatter::try_new(locale.clone().into(), Default::default())
                        .map_err(|e| data_error(&locale, e))?,
                }
            }
            (Some("percent"), None) => NumberStyle::Percent(
                PercentFormatter::try_new(locale.clone().into(), Default::default())
                    .map_err(|e| data_error(&locale, e))?,
            ),
            _ => NumberStyle::Decimal(
                DecimalFormatter::try_new(locale.clone().into(), decimal_options)
                    .map_err(|e| data_error(&locale, e))?,
            ),
        };

        Ok(Self {
            locale,
            style,
            min_integer,
            min_fraction,
            max_fraction,
        })
    }

    /// Format a single number
    pub fn format_number(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }

        let scaled = match self.style {
            NumberStyle::Percent(_) => value * 100.0,
            _ => value,
        };
        let Some(decimal) = self.to_decimal(scaled) else {
            return if scaled.is_sign_negative() { "-∞".to_string() } else { "∞".to_string() };
        };

        match &self.style {
            NumberStyle::Decimal(formatter) => formatter.format(&decimal).to_string(),
            NumberStyle::Percent(formatter) => formatter.format(&decimal).to_string(),
            NumberStyle::Currency { code, formatter } => {
                formatter.format_fixed_decimal(&decimal, CurrencyCode(code.0)).to_string()
            }
        }
    }

    /// Round and pad `value` to the configured digits
    fn to_decimal(&self, value: f64) -> Option<Decimal> {
        // a value that rounds to zero loses its sign
        let scale = 10f64.powi(self.max_fraction as i32);
        let value = if (value.abs() * scale).round() == 0.0 { 0.0 } else { value };

        let mut decimal = Decimal::try_from_f64(value, FloatPrecision::RoundTrip).ok()?;
        let limit = -(self.max_fraction as i16);
        if *decimal.magnitude_range().start() < limit {
            decimal.round(limit);
        }
        decimal.trim_end();
        decimal.pad_end(-(self.min_fraction as i16));
        decimal.pad_start(self.min_integer as i16);
        Some(decimal)
    }
}

impl fmt::Debug for NumberFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = match &self.style {
            NumberStyle::Decimal(_) => "decimal",
            NumberStyle::Percent(_) => "percent",
            NumberStyle::Currency { .. } => "currency",
        };
        f.debug_struct("NumberFormatter")
            .field("locale", &self.locale.to_string())
            .field("style", &style)
            .field("min_integer", &self.min_integer)
            .field("min_fraction", &self.min_fraction)
            .field("max_fraction", &self.max_fraction)
            .finish()
    }
}

impl Formatter for NumberFormatter {
    fn kind(&self) -> FormatterKind {
        KIND
    }

    fn format(&self, input: FormatInput<'_>) -> Result<String> {
        match input {
            FormatInput::Number(value) => Ok(self.format_number(value)),
            other => Err(unsupported_input(KIND, &other)),
        }
    }
}

fn data_error(locale: &Locale, error: impl fmt::Debug) -> IntlError {
    IntlError::construction(KIND, format!("no number data for {}: {:?}", locale, error))
}

/// ISO 4217 minor unit digits
fn currency_digits(code: &str) -> usize {
    match code {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
        "BHD" | "KWD" | "OMR" | "JOD" | "TND" => 3,
        _ => 2,
    }
}
