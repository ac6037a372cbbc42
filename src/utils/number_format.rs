//! Locale-aware number rendering and lenient numeric parsing.

use crate::data::record::DataValue;
use regex::Regex;
use std::sync::OnceLock;

/// Returned for currency values that cannot be read as numbers
pub const CURRENCY_FALLBACK: &str = "0 COP";

/// Returned for composite money strings without an `amount-description` separator
pub const INVALID_COMPOSITE: &str = "Formato inválido";

/// Precision used when a format rule is enabled without an explicit one
pub const DEFAULT_PRECISION: u32 = 2;

/// Separator conventions for rendering numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub grouping: char,
    pub decimal: char,
    /// Integer digits needed beyond the first group before grouping kicks in
    pub min_grouping_digits: usize,
}

impl NumberLocale {
    /// es-CO: `1.234,5`
    pub const COLOMBIA: NumberLocale = NumberLocale {
        grouping: '.',
        decimal: ',',
        min_grouping_digits: 1,
    };

    /// es-ES: `1234,5` but `12.345,5`
    pub const SPAIN: NumberLocale = NumberLocale {
        grouping: '.',
        decimal: ',',
        min_grouping_digits: 2,
    };
}

fn float_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("float prefix pattern is valid")
    })
}

fn non_digit() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\D").expect("non-digit pattern is valid"))
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// `"12.5kg"` reads as 12.5; text without a leading number yields `None`.
pub fn parse_js_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let matched = float_prefix().find(trimmed)?.as_str();
    if matched.ends_with("Infinity") {
        return Some(if matched.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    matched.parse::<f64>().ok()
}

/// Numeric view of a cell value. Booleans count as 1/0.
pub fn coerce_number(value: &DataValue) -> Option<f64> {
    match value {
        DataValue::Integer(i) => Some(*i as f64),
        DataValue::Float(f) if f.is_nan() => None,
        DataValue::Float(f) => Some(*f),
        DataValue::String(s) => parse_js_float(s),
        DataValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        DataValue::Null => None,
    }
}

fn group_integer(digits: &str, locale: NumberLocale) -> String {
    if digits.len() < 3 + locale.min_grouping_digits {
        return digits.to_string();
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(locale.grouping);
        }
        out.push(ch);
    }
    out
}

/// Render `n` with between `min_frac` and `max_frac` fraction digits.
/// Returns the sign separately so callers can place currency symbols.
fn render_number(n: f64, min_frac: usize, max_frac: usize, locale: NumberLocale) -> (bool, String) {
    let max_frac = max_frac.max(min_frac);
    if n.is_infinite() {
        return (n < 0.0, "∞".to_string());
    }

    let fixed = format!("{:.*}", max_frac, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (fixed.clone(), String::new()),
    };

    let mut frac = frac_part;
    while frac.len() > min_frac && frac.ends_with('0') {
        frac.pop();
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let mut body = group_integer(&int_part, locale);
    if !frac.is_empty() {
        body.push(locale.decimal);
        body.push_str(&frac);
    }

    (n < 0.0 && !is_zero, body)
}

/// Format a number with a locale, e.g. `format_number(1234.5, 2, 2, COLOMBIA)` → `1.234,50`
pub fn format_number(n: f64, min_frac: usize, max_frac: usize, locale: NumberLocale) -> String {
    let (negative, body) = render_number(n, min_frac, max_frac, locale);
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

fn format_cop(n: f64, precision: u32) -> String {
    let min = precision as usize;
    let (negative, body) = render_number(n, min, min.max(2), NumberLocale::COLOMBIA);
    format!("{}$\u{a0}{}", if negative { "-" } else { "" }, body)
}

/// Colombian peso rendering: `$ 1.234.567,89`.
///
/// `precision` is the minimum number of fraction digits; at least two are
/// kept when present. Null reads as zero; other non-numeric input yields
/// [`CURRENCY_FALLBACK`].
pub fn format_currency_cop(value: &DataValue, precision: u32) -> String {
    match value {
        DataValue::Null => format_cop(0.0, precision),
        _ => match coerce_number(value) {
            Some(n) => format_cop(n, precision),
            None => CURRENCY_FALLBACK.to_string(),
        },
    }
}

/// Thousands-separated rendering (es-ES). Non-numeric input yields `"0"`.
pub fn format_thousands(value: &DataValue, min_dec: usize, max_dec: usize) -> String {
    match coerce_number(value) {
        Some(n) => format_number(n, min_dec, max_dec, NumberLocale::SPAIN),
        None => "0".to_string(),
    }
}

/// Ratio to percentage with es-ES separators: `0.256` → `26%` (0 decimals).
/// Non-numeric input yields `"0%"`.
pub fn format_percent_locale(value: &DataValue, min_dec: usize, max_dec: usize) -> String {
    match coerce_number(value) {
        Some(n) => format!(
            "{}%",
            format_number(n * 100.0, min_dec, max_dec, NumberLocale::SPAIN)
        ),
        None => "0%".to_string(),
    }
}

/// Ratio to fixed-precision percentage: `0.85` → `85.00%`.
///
/// Null renders as an empty string; `None` means the value is not numeric
/// and should be shown unchanged.
pub fn format_percentage(value: &DataValue, decimals: u32) -> Option<String> {
    if value.is_null() {
        return Some(String::new());
    }
    let n = coerce_number(value)? * 100.0;
    if n.is_infinite() {
        return Some(if n < 0.0 { "-Infinity%" } else { "Infinity%" }.to_string());
    }
    Some(format!("{:.*}%", decimals as usize, n))
}

/// Format an `"amount-description"` string as `"$ 1.500 - (description)"`.
pub fn format_money_with_note(value: &DataValue, decimals: u32) -> String {
    let text = match value {
        DataValue::String(s) if s.contains('-') => s,
        _ => return INVALID_COMPOSITE.to_string(),
    };

    let mut parts = text.split('-');
    let amount = parts.next().unwrap_or_default();
    let note = parts.next().unwrap_or_default();

    match parse_js_float(amount) {
        Some(n) => format!("{} - ({})", format_cop(n, decimals), note.trim()),
        None => CURRENCY_FALLBACK.to_string(),
    }
}

/// Strip every non-digit character from user input
pub fn validate_numeric_value(text: &str) -> String {
    non_digit().replace_all(text, "").into_owned()
}
