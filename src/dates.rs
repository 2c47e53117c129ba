use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::trace;

// Textual layouts tried by the lenient fallback, after commas are dropped
// and whitespace is collapsed.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d-%b-%Y",
    "%a %b %d %Y",
    "%A %B %d %Y",
    "%a %d %b %Y",
];

/// Number of days in `month` (1-based) of `year`, leap years included.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

fn digits(s: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if s.len() < min_len || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Strict `M/D/YYYY` with an optional ` HH:MM[:SS]` or `THH:MM[:SS]` suffix.
///
/// Out of range components are rejected, never clamped: `2/30/2024` is `None`.
pub fn parse_mdy_strict(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    let (date_part, time_part) = match s.find([' ', 'T']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let mut parts = date_part.split('/');
    let month = digits(parts.next()?, 1, 2)?;
    let day = digits(parts.next()?, 1, 2)?;
    let year = digits(parts.next()?, 4, 4)?;
    if parts.next().is_some() {
        return None;
    }

    let (hour, minute, second) = match time_part {
        None => (0, 0, 0),
        Some(t) => {
            let mut tp = t.split(':');
            let hour = digits(tp.next()?, 1, 2)?;
            let minute = digits(tp.next()?, 2, 2)?;
            let second = match tp.next() {
                Some(sec) => digits(sec, 2, 2)?,
                None => 0,
            };
            if tp.next().is_some() {
                return None;
            }
            (hour, minute, second)
        }
    };

    let dim = days_in_month(year as i32, month)?;
    if day < 1 || day > dim || hour > 23 || minute > 59 || second > 59 {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)?.and_hms_opt(hour, minute, second)
}

/// Drop ordinal suffixes that follow a digit: `1st` -> `1`, `22ND` -> `22`.
pub fn strip_ordinals(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c.is_ascii_digit() && i + 1 < chars.len() {
            let suffix = [
                chars[i].to_ascii_lowercase(),
                chars[i + 1].to_ascii_lowercase(),
            ];
            if matches!(suffix, ['s', 't'] | ['n', 'd'] | ['r', 'd'] | ['t', 'h']) {
                i += 2;
            }
        }
    }
    out
}

/// Generic parse of ISO, RFC 2822/3339 and month-name layouts.
pub fn parse_generic(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    let cleaned = s.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" ");
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    trace!("No date layout matched \"{s}\"");
    None
}

/// Strict M/D/Y first; the lenient parse only runs for values containing
/// letters (month names). Anything else is absent.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(dt) = parse_mdy_strict(s) {
        return Some(dt);
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return parse_generic(&strip_ordinals(s));
    }
    None
}

/// Upload dates come from scrapers in many shapes, so after the strict
/// attempt every generic layout is allowed.
pub fn parse_date_loose(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    parse_mdy_strict(s).or_else(|| parse_generic(&strip_ordinals(s)))
}

/// `09 Aug 2025`
pub fn format_date(date: &NaiveDateTime) -> String {
    date.format("%d %b %Y").to_string()
}

/// `H:MM:SS`, `M:SS` or bare seconds. Unparseable parts count as zero, and so
/// does a total that does not fit in `u64`.
pub fn duration_to_seconds(value: &str) -> u64 {
    let parts: Vec<u64> = value
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<u64>().unwrap_or(0))
        .collect();
    let total = match parts.as_slice() {
        [h, m, s] => h
            .checked_mul(3600)
            .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(*s)),
        [m, s] => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
        [first, ..] => Some(*first),
        [] => None,
    };
    total.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn strict_round_trips_components() {
        for (y, m, d) in [(2025, 8, 9), (2024, 2, 29), (1999, 12, 31), (2023, 1, 1)] {
            let text = format!("{m}/{d}/{y}");
            let dt = parse_mdy_strict(&text).unwrap();
            assert_eq!((dt.year(), dt.month(), dt.day()), (y, m, d), "{text}");
            let padded = format!("{m:02}/{d:02}/{y}");
            assert_eq!(parse_mdy_strict(&padded), Some(dt));
        }
    }

    #[test]
    fn strict_rejects_impossible_days() {
        assert_eq!(parse_mdy_strict("2/30/2024"), None);
        assert_eq!(parse_mdy_strict("2/29/2023"), None);
        assert_eq!(parse_mdy_strict("4/31/2024"), None);
        assert_eq!(parse_mdy_strict("13/1/2024"), None);
        assert_eq!(parse_mdy_strict("0/1/2024"), None);
        assert_eq!(parse_mdy_strict("1/0/2024"), None);
    }

    #[test]
    fn strict_accepts_times() {
        let dt = parse_mdy_strict("8/9/2025 14:05").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 5, 0));
        let dt = parse_mdy_strict("8/9/2025T23:59:59").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));
        assert_eq!(parse_mdy_strict("8/9/2025 24:00"), None);
        assert_eq!(parse_mdy_strict("8/9/2025 10:60"), None);
        assert_eq!(parse_mdy_strict("8/9/2025 10:5"), None);
    }

    #[test]
    fn strict_rejects_other_shapes() {
        assert_eq!(parse_mdy_strict("2025-08-09"), None);
        assert_eq!(parse_mdy_strict("8/9/25"), None);
        assert_eq!(parse_mdy_strict("8/9/2025/1"), None);
        assert_eq!(parse_mdy_strict(""), None);
    }

    #[test]
    fn month_names_use_lenient_fallback() {
        let dt = parse_date("10 Feb 2020").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 2, 10));
        let dt = parse_date("February 1st, 2021").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 2, 1));
        let dt = parse_date("Mar 22nd 2019").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2019, 3, 22));
    }

    #[test]
    fn numeric_non_mdy_is_absent() {
        // no letters, so no lenient fallback
        assert_eq!(parse_date("2020-02-10"), None);
        assert_eq!(parse_date("31/12/2020"), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn loose_accepts_iso() {
        let dt = parse_date_loose("2020-02-10").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2020, 2, 10));
        let dt = parse_date_loose("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn ordinals_are_stripped() {
        assert_eq!(strip_ordinals("1st 2nd 3rd 4TH"), "1 2 3 4");
        assert_eq!(strip_ordinals("August 5th"), "August 5");
        assert_eq!(strip_ordinals("1s"), "1s");
    }

    #[test]
    fn formats_like_short_locale_date() {
        let dt = parse_mdy_strict("8/9/2025").unwrap();
        assert_eq!(format_date(&dt), "09 Aug 2025");
    }

    #[test]
    fn durations() {
        assert_eq!(duration_to_seconds("1:02:03"), 3723);
        assert_eq!(duration_to_seconds("4:05"), 245);
        assert_eq!(duration_to_seconds("42"), 42);
        assert_eq!(duration_to_seconds(""), 0);
        assert_eq!(duration_to_seconds("x:10"), 10);
    }

    #[test]
    fn oversized_durations_fall_back_to_zero() {
        assert_eq!(duration_to_seconds("99999999999999999:00:00"), 0);
        assert_eq!(duration_to_seconds("999999999999999999:00"), 0);
        assert_eq!(duration_to_seconds("0:00:18446744073709551615"), u64::MAX);
        assert_eq!(duration_to_seconds("1:00:18446744073709551615"), 0);
    }

    #[test]
    fn days_in_month_respects_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }
}
