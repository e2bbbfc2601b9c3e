//! Serial date codec
//!
//! Spreadsheet formats store timestamps as a floating point count of days since an
//! epoch, with the time of day in the fractional part.
//!
//! Notes:
//! - The 1900 date system counts from 1899-12-31 and keeps the historical "1900 leap
//!   year" defect: every timestamp on or after 1900-03-01 is one day further out than
//!   the calendar says, leaving serial 60 for the non-existent 1900-02-29.
//! - The 1904 date system counts from 1904-01-01 and has no such offset.

use chrono::{DateTime, Duration, Utc};

/// 1899-12-31T00:00:00Z
const EPOCH_1900_SECS: i64 = -2_209_075_200;
/// 1904-01-01T00:00:00Z
const EPOCH_1904_SECS: i64 = -2_082_844_800;
/// 1900-03-01T00:00:00Z, first day shifted by the leap-year defect
const LEAP_BUG_START_SECS: i64 = -2_203_891_200;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MICROS_PER_DAY: f64 = 86_400_000_000.0;
const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;

fn epoch_secs(date1904: bool) -> i64 {
    if date1904 {
        EPOCH_1904_SECS
    } else {
        EPOCH_1900_SECS
    }
}

/// Convert a timestamp into a serial day number
///
/// ```
/// use calculus_core::date::to_serial;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(2020, 9, 22, 9, 0, 0).unwrap();
/// assert_eq!(to_serial(t, false), 44096.375);
/// ```
pub fn to_serial(timestamp: DateTime<Utc>, date1904: bool) -> f64 {
    let seconds = timestamp.timestamp() - epoch_secs(date1904);
    let subsec = timestamp.timestamp_subsec_nanos() as i64;

    let days = match seconds
        .checked_mul(1_000_000_000)
        .and_then(|ns| ns.checked_add(subsec))
    {
        Some(nanos) => nanos as f64 / NANOS_PER_DAY,
        // Beyond ~292 years from the epoch nanoseconds overflow; microseconds suffice
        None => (seconds as f64 + subsec as f64 / 1e9) / SECONDS_PER_DAY,
    };

    if !date1904 && timestamp.timestamp() >= LEAP_BUG_START_SECS {
        days + 1.0
    } else {
        days
    }
}

/// Convert a serial day number back into a timestamp
///
/// The fractional part is resolved to the nearest microsecond. Returns `None` for
/// non-finite values or values outside the representable range.
pub fn from_serial(value: f64, date1904: bool) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let micros = (value * MICROS_PER_DAY).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    let micros = (micros as i64).checked_add(epoch_secs(date1904).checked_mul(1_000_000)?)?;

    let mut secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;

    if !date1904 && secs >= LEAP_BUG_START_SECS {
        secs = secs.checked_sub(86_400)?;
    }

    DateTime::from_timestamp(secs, nanos)
}

/// Express a duration as a (fractional) number of days
pub fn duration_to_serial(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_DAY,
        None => duration.num_milliseconds() as f64 / (MICROS_PER_DAY / 1_000.0),
    }
}

/// Convert a (fractional) number of days into a duration, to the microsecond
pub fn duration_from_serial(value: f64) -> Option<Duration> {
    if !value.is_finite() {
        return None;
    }
    let micros = (value * MICROS_PER_DAY).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}
