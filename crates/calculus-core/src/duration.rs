//! ISO-8601 duration codec
//!
//! Durations are written as `P[nY][nM][nW][nD][T[nH][nM][nS]]`. Calendar units are
//! approximated: a year is 365 days, a month 30 days and a week 7 days, so
//! `P1M` and `P30D` are the same duration. A leading `-` (as allowed by
//! `xs:duration`) negates the value.

use chrono::Duration;
use lazy_regex::regex_captures;

use crate::error::{Error, Result};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

const DAYS_PER_YEAR: i64 = 365;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_WEEK: i64 = 7;

/// Parse an ISO-8601 duration string
///
/// ```
/// use calculus_core::duration;
/// use chrono::Duration;
///
/// assert_eq!(duration::parse("PT1H30M").unwrap(), Duration::minutes(90));
/// assert_eq!(duration::parse("P1W").unwrap(), Duration::days(7));
/// assert!(duration::parse("1H").is_err());
/// ```
pub fn parse(text: &str) -> Result<Duration> {
    let (_, sign, years, months, weeks, days, hours, minutes, seconds) = regex_captures!(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$",
        text
    )
    .ok_or_else(|| Error::MalformedDuration(text.to_string()))?;

    let components = [
        (years, DAYS_PER_YEAR * SECONDS_PER_DAY),
        (months, DAYS_PER_MONTH * SECONDS_PER_DAY),
        (weeks, DAYS_PER_WEEK * SECONDS_PER_DAY),
        (days, SECONDS_PER_DAY),
        (hours, SECONDS_PER_HOUR),
        (minutes, SECONDS_PER_MINUTE),
        (seconds, 1),
    ];

    let mut total: i64 = 0;
    for (digits, unit) in components {
        if digits.is_empty() {
            continue;
        }
        total = digits
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_mul(unit))
            .and_then(|s| total.checked_add(s))
            .ok_or_else(|| Error::MalformedDuration(text.to_string()))?;
    }

    // chrono caps durations at i64::MAX milliseconds
    let duration = Duration::try_seconds(total)
        .ok_or_else(|| Error::MalformedDuration(text.to_string()))?;

    Ok(if sign.is_empty() { duration } else { -duration })
}

/// Format a duration as an ISO-8601 string
///
/// Sub-second precision is dropped. Zero-valued components are omitted and a zero
/// duration is written as `P0D`.
///
/// ```
/// use calculus_core::duration;
/// use chrono::Duration;
///
/// assert_eq!(duration::format(Duration::zero()), "P0D");
/// assert_eq!(duration::format(Duration::days(39)), "P1M1W2D");
/// ```
pub fn format(duration: Duration) -> String {
    let total = duration.num_seconds();
    if total == 0 {
        return "P0D".to_string();
    }

    let mut remaining = total.unsigned_abs();
    let seconds = remaining % 60;
    remaining /= 60;
    let minutes = remaining % 60;
    remaining /= 60;
    let hours = remaining % 24;
    let mut days = remaining / 24;

    let years = days / DAYS_PER_YEAR as u64;
    days %= DAYS_PER_YEAR as u64;
    let months = days / DAYS_PER_MONTH as u64;
    days %= DAYS_PER_MONTH as u64;
    let weeks = days / DAYS_PER_WEEK as u64;
    days %= DAYS_PER_WEEK as u64;

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }
    out.push('P');
    for (value, unit) in [(years, 'Y'), (months, 'M'), (weeks, 'W'), (days, 'D')] {
        if value > 0 {
            out.push_str(&value.to_string());
            out.push(unit);
        }
    }
    if hours > 0 || minutes > 0 || seconds > 0 {
        out.push('T');
        for (value, unit) in [(hours, 'H'), (minutes, 'M'), (seconds, 'S')] {
            if value > 0 {
                out.push_str(&value.to_string());
                out.push(unit);
            }
        }
    }
    out
}
