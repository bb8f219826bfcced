//! Julian Day Number arithmetic.
//!
//! Integer JDNs label whole days (JDN 0 began at noon on 1 January 4713 BC, proleptic Julian).
//! The real-valued day index is the astronomical Julian Date: midnight of a civil day is
//! `JDN - 0.5` and the fractional part carries the time of day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::backend::CalendarBackend;
use crate::date::LunarDate;
use crate::error::{CalendarError, CalendarResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// ## Summary
/// Converts a proleptic Gregorian date to its Julian Day Number.
#[must_use]
pub fn gregorian_to_jdn(year: i32, month: u32, day: u32) -> i64 {
    let (year, month, day) = (i64::from(year), i64::from(month), i64::from(day));
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32_045
}

/// ## Summary
/// Converts a Julian Day Number to a proleptic Gregorian `(year, month, day)`.
#[must_use]
pub fn jdn_to_gregorian(jdn: i64) -> (i64, u32, u32) {
    let a = jdn + 32_044;
    let b = (4 * a + 3).div_euclid(146_097);
    let c = a - (146_097 * b).div_euclid(4);
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);

    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = 100 * b + d - 4800 + m.div_euclid(10);

    // day is 1..=31 and month 1..=12 by construction
    (
        year,
        u32::try_from(month).unwrap_or(1),
        u32::try_from(day).unwrap_or(1),
    )
}

/// JDN of a `chrono` date.
#[must_use]
pub fn date_to_jdn(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    gregorian_to_jdn(date.year(), date.month(), date.day())
}

/// `chrono` date of a JDN, or `None` outside `chrono`'s supported range.
#[must_use]
pub fn jdn_to_date(jdn: i64) -> Option<NaiveDate> {
    let (year, month, day) = jdn_to_gregorian(jdn);
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// ## Summary
/// Converts a Gregorian date-time to a real-valued Julian Date.
#[must_use]
pub fn gregorian_to_day_index(datetime: NaiveDateTime) -> f64 {
    let jdn = date_to_jdn(datetime.date());
    let seconds = f64::from(datetime.time().num_seconds_from_midnight());
    jdn_as_f64(jdn) - 0.5 + seconds / SECONDS_PER_DAY
}

/// ## Summary
/// Converts a real-valued Julian Date back to a Gregorian date-time, rounded to the second.
///
/// Returns `None` for non-finite input or dates `chrono` cannot represent.
#[must_use]
pub fn day_index_to_gregorian(index: f64) -> Option<NaiveDateTime> {
    let (jdn, seconds) = split_day_index(index)?;
    let date = jdn_to_date(jdn)?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(date.and_time(time))
}

/// ## Summary
/// Converts a lunar date to a real-valued Julian Date through `backend`.
///
/// ## Errors
/// Propagates backend failures (invalid date, failed observational search).
pub fn lunar_to_day_index<B>(date: &LunarDate, backend: &B) -> CalendarResult<f64>
where
    B: CalendarBackend + ?Sized,
{
    let jdn = backend.to_day_index(date.year(), date.month(), date.day())?;
    let seconds = u32::from(date.hour()) * 3600 + u32::from(date.minute()) * 60
        + u32::from(date.second());
    Ok(jdn_as_f64(jdn) - 0.5 + f64::from(seconds) / SECONDS_PER_DAY)
}

/// ## Summary
/// Converts a real-valued Julian Date to a lunar date through `backend`.
///
/// ## Errors
/// Returns `InvalidInput` for non-finite indices and `OutOfRange` before the calendar epoch.
pub fn day_index_to_lunar<B>(index: f64, backend: &B) -> CalendarResult<LunarDate>
where
    B: CalendarBackend + ?Sized,
{
    let Some((jdn, seconds)) = split_day_index(index) else {
        return Err(CalendarError::InvalidInput(format!(
            "day index {index} is not a finite number"
        )));
    };
    let date = LunarDate::from_day_index(jdn, backend)?;
    let seconds = u8::try_from(seconds / 3600)
        .ok()
        .zip(u8::try_from(seconds % 3600 / 60).ok())
        .zip(u8::try_from(seconds % 60).ok());
    match seconds {
        Some(((hour, minute), second)) => date.with_time(hour, minute, second),
        None => Ok(date),
    }
}

/// Civil-day JDN containing a Julian Date.
pub(crate) fn julian_date_to_jdn(julian_date: f64) -> Option<i64> {
    split_day_index(julian_date).map(|(jdn, _)| jdn)
}

/// Splits a Julian Date into its civil-day JDN and seconds since midnight.
fn split_day_index(index: f64) -> Option<(i64, u32)> {
    if !index.is_finite() {
        return None;
    }
    let shifted = index + 0.5;
    let day = shifted.floor();
    let mut jdn = f64_as_i64(day)?;
    let mut seconds = ((shifted - day) * SECONDS_PER_DAY).round();
    if seconds >= SECONDS_PER_DAY {
        jdn += 1;
        seconds = 0.0;
    }
    let seconds = u32::try_from(f64_as_i64(seconds)?).ok()?;
    Some((jdn, seconds))
}

#[expect(
    clippy::cast_precision_loss,
    reason = "Julian Day Numbers of supported dates are far below 2^52"
)]
fn jdn_as_f64(jdn: i64) -> f64 {
    jdn as f64
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "input is already floored and range-checked"
)]
fn f64_as_i64(value: f64) -> Option<i64> {
    // 2^63, exclusive
    const LIMIT: f64 = 9.223_372_036_854_776e18;
    (value > -LIMIT && value < LIMIT).then(|| value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_julian_day_numbers() {
        assert_eq!(gregorian_to_jdn(2000, 1, 1), 2_451_545);
        assert_eq!(gregorian_to_jdn(2025, 3, 1), 2_460_736);
        assert_eq!(gregorian_to_jdn(622, 7, 19), 1_948_440);
        assert_eq!(gregorian_to_jdn(-4713, 11, 24), 0);
    }

    #[test]
    fn inverse_of_known_numbers() {
        assert_eq!(jdn_to_gregorian(2_451_545), (2000, 1, 1));
        assert_eq!(jdn_to_gregorian(2_460_854), (2025, 6, 27));
        assert_eq!(jdn_to_gregorian(0), (-4713, 11, 24));
    }

    #[test]
    fn gregorian_round_trip_over_leap_boundaries() {
        for jdn in 2_451_500..2_452_300 {
            let (y, m, d) = jdn_to_gregorian(jdn);
            assert_eq!(gregorian_to_jdn(i32::try_from(y).unwrap(), m, d), jdn);
        }
    }

    #[test]
    fn day_index_is_noon_referenced() {
        let midnight = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let noon = midnight + chrono::Duration::hours(12);
        assert!((gregorian_to_day_index(midnight) - 2_451_544.5).abs() < 1e-9);
        assert!((gregorian_to_day_index(noon) - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn day_index_round_trip_keeps_seconds() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(day_index_to_gregorian(gregorian_to_day_index(dt)), Some(dt));
    }

    #[test]
    fn day_index_rejects_non_finite() {
        assert_eq!(day_index_to_gregorian(f64::NAN), None);
        assert_eq!(day_index_to_gregorian(f64::INFINITY), None);
    }
}
