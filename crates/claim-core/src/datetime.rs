//! Natural-language date/time normalization.
//!
//! Callers describe when an accident happened in whatever words come to
//! mind ("yesterday at 3pm", "last Tuesday evening", "May 15th 2024"). This
//! module turns the common shapes of those into `YYYY-MM-DDTHH:MM:SSZ`, and
//! hands anything it cannot place back untouched as [`Parsed::RawFallback`].

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::parsed::Parsed;

static AGO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten)\s+(minute|hour|day|week)s?\s+ago\b")
        .expect("ago regex must compile")
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso date regex must compile"));
static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b{MONTHS}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("month-day regex must compile")
});
static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTHS}\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("day-month regex must compile")
});
static SLASH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2}|\d{4}))?\b").expect("slash date regex must compile")
});
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(last\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday regex must compile")
});
static MERIDIEM_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})(?::([0-5]\d))?\s*([ap])\.?\s?m\b\.?").expect("12h time regex must compile")
});
static CLOCK_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)(?::([0-5]\d))?\b").expect("24h time regex must compile")
});

const MONTHS: &str = "(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)";

/// Offset-less ISO-like forms accepted as-is apart from the missing zone.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Normalize a caller's description of a date/time against `now`.
///
/// Input that is already RFC 3339 is kept verbatim. Everything else that
/// can be placed is rendered in UTC with a `Z` suffix.
pub fn normalize_datetime(input: &str, now: DateTime<Utc>) -> Parsed<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Parsed::RawFallback(input.to_string());
    }

    if DateTime::parse_from_rfc3339(trimmed).is_ok() {
        return Parsed::Structured(trimmed.to_string());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Parsed::Structured(render(parsed));
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Parsed::Structured(render(date.and_time(NaiveTime::MIN)));
        }
    }

    match parse_natural(&trimmed.to_lowercase(), now) {
        Some(parsed) => Parsed::Structured(render(parsed)),
        None => Parsed::RawFallback(input.to_string()),
    }
}

fn render(value: NaiveDateTime) -> String {
    if value.nanosecond() == 0 {
        format!("{}Z", value.format("%Y-%m-%dT%H:%M:%S"))
    } else {
        format!("{}Z", value.format("%Y-%m-%dT%H:%M:%S%.f"))
    }
}

/// What a date expression resolved to.
enum DateAnchor {
    /// A specific instant ("2 hours ago").
    Instant(NaiveDateTime),
    Day(NaiveDate),
}

fn parse_natural(text: &str, now: DateTime<Utc>) -> Option<NaiveDateTime> {
    let now = now.naive_utc();
    let today = now.date();

    // An impossible calendar date is a miss, not a reason to keep looking.
    let anchor = match find_date(text, now) {
        Some(Ok(anchor)) => Some(anchor),
        Some(Err(())) => return None,
        None => None,
    };
    let time = find_time(text);

    match (anchor, time) {
        (Some(DateAnchor::Instant(instant)), _) => Some(instant),
        (Some(DateAnchor::Day(day)), Some(time)) => Some(day.and_time(time)),
        (Some(DateAnchor::Day(day)), None) => Some(day.and_time(default_time(text))),
        (None, Some(time)) => Some(today.and_time(time)),
        (None, None) => None,
    }
}

/// `Some(Err(()))` means a date was written but does not exist.
fn find_date(text: &str, now: NaiveDateTime) -> Option<Result<DateAnchor, ()>> {
    let today = now.date();

    if let Some(caps) = AGO_RE.captures(text) {
        let amount = count_word(&caps[1])?;
        // Counts past chrono's range are a miss, not a panic.
        let anchor = match &caps[2] {
            "minute" => Duration::try_minutes(amount)
                .and_then(|ago| now.checked_sub_signed(ago))
                .map(DateAnchor::Instant),
            "hour" => Duration::try_hours(amount)
                .and_then(|ago| now.checked_sub_signed(ago))
                .map(DateAnchor::Instant),
            "day" => Duration::try_days(amount)
                .and_then(|ago| today.checked_sub_signed(ago))
                .map(DateAnchor::Day),
            _ => Duration::try_weeks(amount)
                .and_then(|ago| today.checked_sub_signed(ago))
                .map(DateAnchor::Day),
        };
        return Some(anchor.ok_or(()));
    }

    if let Some(caps) = ISO_DATE_RE.captures(text) {
        let date = ymd(number(&caps, 1), number(&caps, 2), number(&caps, 3));
        return Some(date.map(DateAnchor::Day).ok_or(()));
    }

    if let Some(caps) = MONTH_DAY_RE.captures(text) {
        return Some(month_name_date(&caps[1], number(&caps, 2), caps.get(3), today));
    }
    if let Some(caps) = DAY_MONTH_RE.captures(text) {
        return Some(month_name_date(&caps[2], number(&caps, 1), caps.get(3), today));
    }

    if let Some(caps) = SLASH_DATE_RE.captures(text) {
        let year = match caps.get(3) {
            Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
            Some(y) => y.as_str().parse().ok()?,
            None => today.year(),
        };
        let date = ymd(year, number(&caps, 1), number(&caps, 2));
        return Some(date.map(DateAnchor::Day).ok_or(()));
    }

    if let Some(caps) = WEEKDAY_RE.captures(text) {
        let weekday = weekday_from_name(&caps[2])?;
        let mut days_back = (7 + today.weekday().num_days_from_monday()
            - weekday.num_days_from_monday())
            % 7;
        if days_back == 0 && caps.get(1).is_some() {
            days_back = 7;
        }
        return Some(Ok(DateAnchor::Day(today - Duration::days(days_back as i64))));
    }

    let offset = if contains_word(text, "yesterday") || text.contains("last night") {
        -1
    } else if contains_word(text, "tomorrow") {
        1
    } else if ["today", "tonight", "this morning", "this afternoon", "this evening"]
        .iter()
        .any(|phrase| text.contains(phrase))
    {
        0
    } else {
        return None;
    };
    Some(Ok(DateAnchor::Day(today + Duration::days(offset))))
}

fn find_time(text: &str) -> Option<NaiveTime> {
    if let Some(caps) = MERIDIEM_TIME_RE.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let hour = match (&caps[3], hour) {
            ("a", 12) => 0,
            ("a", h) => h,
            ("p", 12) => 12,
            (_, h) => h + 12,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = CLOCK_TIME_RE.captures(text) {
        let second = caps.get(3).map_or(0, |s| s.as_str().parse().unwrap_or(0));
        return NaiveTime::from_hms_opt(number(&caps, 1), number(&caps, 2), second);
    }

    if contains_word(text, "noon") {
        return NaiveTime::from_hms_opt(12, 0, 0);
    }
    if contains_word(text, "midnight") {
        return Some(NaiveTime::MIN);
    }
    None
}

/// Time implied by a part-of-day word when no clock time was given.
fn default_time(text: &str) -> NaiveTime {
    let hour = if contains_word(text, "morning") {
        9
    } else if contains_word(text, "afternoon") {
        15
    } else if contains_word(text, "evening") {
        19
    } else if contains_word(text, "night") || contains_word(text, "tonight") {
        21
    } else {
        0
    };
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn month_name_date(
    month: &str,
    day: u32,
    year: Option<regex::Match<'_>>,
    today: NaiveDate,
) -> Result<DateAnchor, ()> {
    let month = month_number(month).ok_or(())?;
    let year = match year {
        Some(y) => y.as_str().parse().map_err(|_| ())?,
        None => today.year(),
    };
    ymd(year, month, day).map(DateAnchor::Day).ok_or(())
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn number<T: std::str::FromStr + Default>(caps: &Captures<'_>, index: usize) -> T {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_default()
}

fn month_number(name: &str) -> Option<u32> {
    let month = match &name[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    name.parse().ok()
}

fn count_word(word: &str) -> Option<i64> {
    let count = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => digits.parse().ok()?,
    };
    Some(count)
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}
