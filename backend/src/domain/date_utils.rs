//! Date handling for member records.
//!
//! Stored dates arrive in several shapes: native dates, spreadsheet serial day
//! counts (epoch 1899-12-30) and `M/D/YYYY` text typed by hand. Everything is
//! funnelled through [`parse_flexible_date`], which returns `None` rather than
//! an error so callers can fall back to another date.

use chrono::{Datelike, Months, NaiveDate};

/// Day zero of the spreadsheet serial-date convention
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// A raw cell value as found in the member table
#[derive(Debug, Clone, PartialEq)]
pub enum SheetValue {
    Empty,
    Date(NaiveDate),
    Serial(f64),
    Text(String),
}

impl SheetValue {
    /// Classify a textual cell. Purely numeric cells are treated as serial dates.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return SheetValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(serial) if serial.is_finite() => SheetValue::Serial(serial),
            _ => SheetValue::Text(trimmed.to_string()),
        }
    }
}

impl From<NaiveDate> for SheetValue {
    fn from(date: NaiveDate) -> Self {
        SheetValue::Date(date)
    }
}

/// Parse any supported date representation into a calendar date.
pub fn parse_flexible_date(value: &SheetValue) -> Option<NaiveDate> {
    match value {
        SheetValue::Empty => None,
        SheetValue::Date(date) => Some(*date),
        SheetValue::Serial(days) => serial_to_date(*days),
        SheetValue::Text(text) => parse_date_text(text),
    }
}

/// Parse a text cell: an `M/D/YYYY` token anywhere in the text, else ISO `YYYY-MM-DD`
/// (optionally followed by a time part).
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| c == ',' || c == ';');
        if let Some(date) = parse_slash_token(token) {
            return Some(date);
        }
    }

    parse_iso_date(text)
}

fn parse_slash_token(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split('/');
    let month = parts.next()?;
    let day = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let all_digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
    };
    if !all_digits(month, 1, 2) || !all_digits(day, 1, 2) || !all_digits(year, 4, 4) {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse `YYYY-MM-DD`, ignoring anything after the date (e.g. an RFC 3339 time part)
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let head = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Convert a spreadsheet serial day count. Fractional parts are time of day and dropped.
pub fn serial_to_date(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() || days.abs() > 3_000_000.0 {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(chrono::Duration::days(days.floor() as i64))
}

/// Add calendar months, carrying month overflow into the year.
///
/// The day of month is clamped to the last day of the target month, so
/// Jan 31 + 1 month is Feb 28 (or Feb 29 in a leap year).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Canonical external representation: `M/D/YYYY` without zero padding
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = add_months(first, 1)
        .pred_opt()
        .unwrap_or(first);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_slash_text() {
        assert_eq!(parse_date_text("3/7/2025"), Some(ymd(2025, 3, 7)));
        assert_eq!(parse_date_text("12/31/2024"), Some(ymd(2024, 12, 31)));
        assert_eq!(parse_date_text(" 01/05/2025 "), Some(ymd(2025, 1, 5)));
        assert_eq!(parse_date_text("Due 4/1/2025 10:00"), Some(ymd(2025, 4, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_date_text("13/45/2025"), None);
        assert_eq!(parse_date_text("2/30/2025"), None);
        assert_eq!(parse_date_text("soon"), None);
        assert_eq!(parse_date_text("1/2/25"), None);
        assert_eq!(parse_flexible_date(&SheetValue::Empty), None);
    }

    #[test]
    fn test_parse_iso_fallback() {
        assert_eq!(parse_date_text("2025-02-14"), Some(ymd(2025, 2, 14)));
        assert_eq!(
            parse_date_text("2025-02-14T08:30:00.000Z"),
            Some(ymd(2025, 2, 14))
        );
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_to_date(0.0), Some(ymd(1899, 12, 30)));
        assert_eq!(serial_to_date(1.0), Some(ymd(1899, 12, 31)));
        assert_eq!(serial_to_date(45658.0), Some(ymd(2025, 1, 1)));
        assert_eq!(serial_to_date(45658.75), Some(ymd(2025, 1, 1)));
        assert_eq!(serial_to_date(f64::NAN), None);
    }

    #[test]
    fn test_cell_classification() {
        assert_eq!(SheetValue::from_cell(""), SheetValue::Empty);
        assert_eq!(SheetValue::from_cell("45658"), SheetValue::Serial(45658.0));
        assert_eq!(
            SheetValue::from_cell("1/1/2025"),
            SheetValue::Text("1/1/2025".to_string())
        );
        assert_eq!(
            parse_flexible_date(&SheetValue::from_cell("45658")),
            Some(ymd(2025, 1, 1))
        );
        assert_eq!(
            parse_flexible_date(&ymd(2025, 6, 1).into()),
            Some(ymd(2025, 6, 1))
        );
    }

    #[test]
    fn test_add_months_rolls_year() {
        assert_eq!(add_months(ymd(2025, 11, 15), 3), ymd(2026, 2, 15));
        assert_eq!(add_months(ymd(2025, 1, 10), 12), ymd(2026, 1, 10));
        assert_eq!(add_months(ymd(2025, 5, 20), 0), ymd(2025, 5, 20));
        assert_eq!(add_months(ymd(2025, 12, 1), 25), ymd(2028, 1, 1));
    }

    #[test]
    fn test_add_months_clamps_short_months() {
        assert_eq!(add_months(ymd(2025, 1, 31), 1), ymd(2025, 2, 28));
        assert_eq!(add_months(ymd(2024, 1, 31), 1), ymd(2024, 2, 29));
        assert_eq!(add_months(ymd(2025, 3, 31), 1), ymd(2025, 4, 30));
        assert_eq!(add_months(ymd(2025, 8, 31), 6), ymd(2026, 2, 28));
    }

    #[test]
    fn test_format_has_no_padding() {
        assert_eq!(format_date(ymd(2025, 3, 7)), "3/7/2025");
        assert_eq!(format_date(ymd(2025, 11, 30)), "11/30/2025");
        assert_eq!(format_optional_date(None), "");
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(ymd(2025, 2, 14)), (ymd(2025, 2, 1), ymd(2025, 2, 28)));
        assert_eq!(month_bounds(ymd(2024, 12, 31)), (ymd(2024, 12, 1), ymd(2024, 12, 31)));
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(ymd(2025, 1, 1), ymd(2025, 1, 11)), 10);
        assert_eq!(days_between(ymd(2025, 1, 11), ymd(2025, 1, 1)), -10);
        assert_eq!(days_between(ymd(2024, 12, 31), ymd(2025, 3, 1)), 60);
    }
}
