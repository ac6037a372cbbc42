//! Date rendering for table cells and small date-related helpers.

use crate::data::record::DataValue;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use serde::Serialize;

/// Shown for empty, sentinel, or unparsable dates
pub const NO_DATE: &str = "No registra";

/// Placeholder some sources use for "no date"
const ZERO_DATE: &str = "0000-00-00";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Parse a date-like string as a local date-time.
///
/// Strings with an explicit offset are converted to local time; everything
/// else is taken as a local calendar value.
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn render(dt: NaiveDateTime) -> String {
    if dt.hour() != 0 || dt.minute() != 0 {
        dt.format("%Y-%m-%d %H:%M").to_string()
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// Render a date string as `YYYY-MM-DD`, adding ` HH:MM` when the time is not midnight
pub fn format_date_str(text: &str) -> String {
    if text.is_empty() || text == ZERO_DATE {
        return NO_DATE.to_string();
    }
    parse_date_time(text)
        .map(render)
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Render any cell value as a date. Numbers are epoch milliseconds.
pub fn format_date(value: &DataValue) -> String {
    match value {
        DataValue::String(s) => format_date_str(s),
        DataValue::Integer(ms) if *ms != 0 => Local
            .timestamp_millis_opt(*ms)
            .single()
            .map(|dt| render(dt.naive_local()))
            .unwrap_or_else(|| NO_DATE.to_string()),
        DataValue::Float(ms) if *ms != 0.0 && ms.is_finite() => Local
            .timestamp_millis_opt(*ms as i64)
            .single()
            .map(|dt| render(dt.naive_local()))
            .unwrap_or_else(|| NO_DATE.to_string()),
        _ => NO_DATE.to_string(),
    }
}

/// Parse a strict `YYYY-MM-DD` string
pub fn parse_ymd(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('-');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Value/label pair for select inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Months with zero-padded numeric values: `{"01", "Enero"}` …
pub fn month_options() -> Vec<SelectOption> {
    MONTHS
        .iter()
        .enumerate()
        .map(|(idx, name)| SelectOption {
            value: format!("{:02}", idx + 1),
            label: (*name).to_string(),
        })
        .collect()
}

/// `count` years counting down from `latest`
pub fn year_options(latest: i32, count: usize) -> Vec<SelectOption> {
    (0..count as i32)
        .map(|offset| {
            let year = (latest - offset).to_string();
            SelectOption {
                value: year.clone(),
                label: year,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(format_date_str(""), NO_DATE);
        assert_eq!(format_date_str("0000-00-00"), NO_DATE);
        assert_eq!(format_date_str("not a date"), NO_DATE);
        assert_eq!(format_date_str("2023-02-30"), NO_DATE);
        assert_eq!(format_date(&DataValue::Null), NO_DATE);
    }

    #[test]
    fn test_date_only() {
        assert_eq!(format_date_str("2023-01-15"), "2023-01-15");
        assert_eq!(format_date_str("2023/01/15"), "2023-01-15");
    }

    #[test]
    fn test_time_component() {
        assert_eq!(format_date_str("2023-01-15 08:05:00"), "2023-01-15 08:05");
        assert_eq!(format_date_str("2023-01-15T00:00:00"), "2023-01-15");
        assert_eq!(format_date_str("2023-01-15T17:30"), "2023-01-15 17:30");
    }

    #[test]
    fn test_parse_ymd() {
        assert_eq!(parse_ymd("2024-03-09"), NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(parse_ymd("2024-13-01"), None);
        assert_eq!(parse_ymd("2024-03"), None);
    }

    #[test]
    fn test_options() {
        let months = month_options();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].value, "01");
        assert_eq!(months[11].label, "Diciembre");

        let years = year_options(2025, 3);
        let values: Vec<&str> = years.iter().map(|y| y.value.as_str()).collect();
        assert_eq!(values, vec!["2025", "2024", "2023"]);
    }
}
