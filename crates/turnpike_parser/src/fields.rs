//! Cell-level parsing. Everything here degrades instead of failing: a
//! malformed amount becomes 0, a malformed date becomes absent, and the row
//! survives either way.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Timestamp formats tried first, the shapes turnpike exports actually use.
const DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %I:%M %p", "%m/%d/%Y %H:%M"];

/// Date-only shapes; parsed values land at midnight.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y"];

/// Last-resort shapes for exports that drifted to ISO or carry seconds.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d"];

/// Parse a date cell. The first format producing a valid calendar timestamp
/// wins; anything else is absent, never an error.
pub(crate) fn parse_cell_datetime(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS.iter().chain(FALLBACK_DATETIME_FORMATS) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS.iter().chain(FALLBACK_DATE_FORMATS) {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Parse an amount cell like "$1.72", "1,234.56" or "7" into cents without
/// going through floating point. Unparsable or absent input is 0.
pub(crate) fn parse_cell_amount(value: &str) -> i64 {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let s = cleaned.trim();
    if s.is_empty() {
        return 0;
    }

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return 0;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }

    let whole_cents = match whole {
        "" => 0,
        w => match w.parse::<i64>() {
            Ok(v) => v.saturating_mul(100),
            Err(_) => return 0,
        },
    };

    // Two fraction digits are cents; a third digit rounds.
    let frac_digits: Vec<i64> = frac
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(i64::from)
        .collect();
    let mut frac_cents = 0;
    if let Some(d) = frac_digits.first() {
        frac_cents += d * 10;
    }
    if let Some(d) = frac_digits.get(1) {
        frac_cents += d;
    }
    if let Some(d) = frac_digits.get(2) {
        if *d >= 5 {
            frac_cents += 1;
        }
    }

    let cents = whole_cents.saturating_add(frac_cents);
    if negative { -cents } else { cents }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_datetime_twelve_hour() {
        assert_eq!(
            parse_cell_datetime("01/15/2024 09:30 AM"),
            Some(dt(2024, 1, 15, 9, 30))
        );
        assert_eq!(
            parse_cell_datetime("01/15/2024 09:30 PM"),
            Some(dt(2024, 1, 15, 21, 30))
        );
    }

    #[test]
    fn test_parse_datetime_twenty_four_hour() {
        assert_eq!(
            parse_cell_datetime("01/15/2024 21:30"),
            Some(dt(2024, 1, 15, 21, 30))
        );
    }

    #[test]
    fn test_parse_date_only_lands_at_midnight() {
        assert_eq!(
            parse_cell_datetime("01/15/2024"),
            Some(dt(2024, 1, 15, 0, 0))
        );
    }

    #[test]
    fn test_parse_datetime_iso_fallback() {
        assert_eq!(
            parse_cell_datetime("2024-01-15 21:30:05"),
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(21, 30, 5)
                    .unwrap()
            )
        );
        assert_eq!(parse_cell_datetime("2024-01-15"), Some(dt(2024, 1, 15, 0, 0)));
    }

    #[test]
    fn test_parse_datetime_invalid_is_absent() {
        assert_eq!(parse_cell_datetime(""), None);
        assert_eq!(parse_cell_datetime("not a date"), None);
        assert_eq!(parse_cell_datetime("13/45/2024"), None);
    }

    #[test]
    fn test_parse_amount_currency_and_separators() {
        assert_eq!(parse_cell_amount("$12.34"), 1234);
        assert_eq!(parse_cell_amount("$1,234.56"), 123456);
        assert_eq!(parse_cell_amount(" 1.72 "), 172);
    }

    #[test]
    fn test_parse_amount_whole_and_partial() {
        assert_eq!(parse_cell_amount("7"), 700);
        assert_eq!(parse_cell_amount("2.5"), 250);
        assert_eq!(parse_cell_amount(".5"), 50);
        assert_eq!(parse_cell_amount("12."), 1200);
    }

    #[test]
    fn test_parse_amount_third_digit_rounds() {
        assert_eq!(parse_cell_amount("1.005"), 101);
        assert_eq!(parse_cell_amount("1.004"), 100);
        assert_eq!(parse_cell_amount("0.999"), 100);
    }

    #[test]
    fn test_parse_amount_negative_refund() {
        assert_eq!(parse_cell_amount("-3.50"), -350);
        assert_eq!(parse_cell_amount("-$2.00"), -200);
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert_eq!(parse_cell_amount(""), 0);
        assert_eq!(parse_cell_amount("abc"), 0);
        assert_eq!(parse_cell_amount("1.2.3"), 0);
        assert_eq!(parse_cell_amount("$"), 0);
    }
}
