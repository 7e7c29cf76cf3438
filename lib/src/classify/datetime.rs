//! Generic date/time recognition for text cells.
//!
//! Formats are tried in order. Ambiguous numeric dates read month-first
//! (`01/02/2023` is January 2nd); the day-first reading is only reached when
//! the month-first one is impossible (`13/02/2023`). Two-digit year forms are
//! tried before four-digit ones so `01/02/23` does not parse as year 23.
//!
//! A format only applies when it has as many whitespace-separated tokens as
//! the input, so `Jan 2023` can never be read as `%B %d %Y` with the year
//! split into day `20` and year `23`. Year-month forms read as the first day
//! of the month, and a trailing `UTC`, `GMT` or `Z` marks a UTC timestamp.

use crate::table::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// Numeric UTC offsets, e.g. `2023-01-05 10:30:00+0200`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m-%d-%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
];

/// Dates without a day; parsed with the day fixed to 1.
const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m/%Y", "%B %Y", "%B, %Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "UTC", "Z"];

fn token_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Formats whose token count matches `s`.
fn candidates<'a>(s: &str, formats: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
    let n = token_count(s);
    formats
        .iter()
        .copied()
        .filter(move |fmt| token_count(fmt) == n)
}

fn strip_utc_suffix(s: &str) -> Option<&str> {
    UTC_SUFFIXES.iter().find_map(|suffix| {
        let rest = s.strip_suffix(suffix)?.trim_end();
        rest.ends_with(|c: char| c.is_ascii_digit()).then_some(rest)
    })
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    if let Some(dt) = candidates(s, DATETIME_FORMATS)
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    if let Some(d) =
        candidates(s, DATE_FORMATS).find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return d.and_hms_opt(0, 0, 0);
    }
    let first_of_month = format!("{s} 1");
    if let Some(d) = candidates(s, YEAR_MONTH_FORMATS)
        .find_map(|fmt| NaiveDate::parse_from_str(&first_of_month, &format!("{fmt} %d")).ok())
    {
        return d.and_hms_opt(0, 0, 0);
    }
    candidates(s, TIME_FORMATS)
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .and_then(|t| NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(t)))
}

/// Parses a string as a date, datetime, year-month or time of day.
///
/// Bare times are anchored to 1970-01-01. Offsets are normalized to UTC.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = candidates(s, OFFSET_FORMATS)
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.naive_utc());
    }
    if let Some(rest) = strip_utc_suffix(s) {
        if let Some(dt) = parse_naive(rest) {
            return Some(dt);
        }
    }
    parse_naive(s)
}

/// Whether a cell reads as a point in time.
pub fn is_datetime_like(value: &Value) -> bool {
    match value {
        Value::Timestamp(_) => true,
        Value::Text(s) => parse_datetime(s).is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_iso_dates_and_datetimes() {
        assert_eq!(parse_datetime("2023-01-05"), Some(ymd(2023, 1, 5)));
        assert!(parse_datetime("2023-01-05 10:30:00").is_some());
        assert!(parse_datetime("2023-01-05T10:30:00.250").is_some());
        assert!(parse_datetime("2023-01-05T10:30:00+02:00").is_some());
    }

    #[test]
    fn test_month_first_ambiguity() {
        assert_eq!(parse_datetime("01/02/2023"), Some(ymd(2023, 1, 2)));
        assert_eq!(parse_datetime("13/02/2023"), Some(ymd(2023, 2, 13)));
        assert_eq!(parse_datetime("01/02/23"), Some(ymd(2023, 1, 2)));
    }

    #[test]
    fn test_named_months_and_times() {
        assert_eq!(parse_datetime("March 4, 2021"), Some(ymd(2021, 3, 4)));
        assert_eq!(parse_datetime("4 Mar 2021"), Some(ymd(2021, 3, 4)));
        assert!(parse_datetime("10:30").is_some());
        assert!(parse_datetime("7:05 PM").is_some());
    }

    #[test]
    fn test_year_month_reads_first_of_month() {
        assert_eq!(parse_datetime("2023-01"), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_datetime("2023/11"), Some(ymd(2023, 11, 1)));
        assert_eq!(parse_datetime("07/2021"), Some(ymd(2021, 7, 1)));
        assert_eq!(parse_datetime("Jan 2023"), Some(ymd(2023, 1, 1)));
        assert_eq!(parse_datetime("September 2019"), Some(ymd(2019, 9, 1)));
    }

    #[test]
    fn test_named_month_does_not_split_year() {
        // "2023" must stay a year, never day 20 of year 23
        assert_ne!(parse_datetime("Jan 2023"), Some(ymd(23, 1, 20)));
        assert_eq!(parse_datetime("Jan 20 2023"), Some(ymd(2023, 1, 20)));
    }

    #[test]
    fn test_dashed_and_day_first_with_time() {
        let jan5 = ymd(2023, 1, 5);
        assert_eq!(
            parse_datetime("01-05-2023 10:30"),
            jan5.date().and_hms_opt(10, 30, 0)
        );
        assert_eq!(
            parse_datetime("25-12-2023 08:15:00"),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap().and_hms_opt(8, 15, 0)
        );
        assert_eq!(
            parse_datetime("25.12.2023 08:15"),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap().and_hms_opt(8, 15, 0)
        );
        assert_eq!(
            parse_datetime("5 January 2023 10:00"),
            jan5.date().and_hms_opt(10, 0, 0)
        );
        assert_eq!(
            parse_datetime("January 5, 2023 10:00"),
            jan5.date().and_hms_opt(10, 0, 0)
        );
    }

    #[test]
    fn test_utc_markers_and_offsets() {
        let expected = ymd(2023, 1, 5).date().and_hms_opt(10, 30, 0);
        assert_eq!(parse_datetime("2023-01-05 10:30:00 UTC"), expected);
        assert_eq!(parse_datetime("2023-01-05 10:30:00 GMT"), expected);
        assert_eq!(parse_datetime("2023-01-05 10:30Z"), expected);
        assert_eq!(parse_datetime("2023-01-05T10:30:00Z"), expected);
        assert_eq!(parse_datetime("2023-01-05 12:30:00+0200"), expected);
        assert_eq!(parse_datetime("2023-01-05 12:30:00 +02:00"), expected);
    }

    #[test]
    fn test_non_dates() {
        assert_eq!(parse_datetime("n/a"), None);
        assert_eq!(parse_datetime("red"), None);
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("2023-13-45"), None);
        assert_eq!(parse_datetime("img_001.png"), None);
        assert_eq!(parse_datetime("UTC"), None);
        assert_eq!(parse_datetime("Zebra"), None);
        assert_eq!(parse_datetime("Jan"), None);
    }

    #[test]
    fn test_is_datetime_like_cells() {
        assert!(is_datetime_like(&Value::text("2020-01-01")));
        assert!(is_datetime_like(&Value::Timestamp(ymd(2020, 1, 1))));
        assert!(!is_datetime_like(&Value::Int(20200101)));
    }
}
